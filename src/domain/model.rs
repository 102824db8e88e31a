use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::ModelError;

/// Field name to value mapping of a record. Keeps insertion order.
pub type Fields = serde_json::Map<String, serde_json::Value>;

pub const UUID_FIELD: &str = "uuid";
pub const TYPE_FIELD: &str = "type";

/// Identifier accepted by store lookups: a uuid string or a numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Key(String),
    Numeric(i64),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Key(key) => f.write_str(key),
            RecordId::Numeric(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Key(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Key(value)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Numeric(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryType {
    #[default]
    And,
    Or,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryType::And => f.write_str("AND"),
            QueryType::Or => f.write_str("OR"),
        }
    }
}

impl FromStr for QueryType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AND" => Ok(QueryType::And),
            "OR" => Ok(QueryType::Or),
            _ => Err(ModelError::InvalidConfigValueError {
                field: "query_type".to_string(),
                value: s.to_string(),
                reason: "Expected AND or OR".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("ASC"),
            SortOrder::Desc => f.write_str("DESC"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            _ => Err(ModelError::InvalidConfigValueError {
                field: "sort_order".to_string(),
                value: s.to_string(),
                reason: "Expected ASC or DESC".to_string(),
            }),
        }
    }
}
