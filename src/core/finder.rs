//! Parser for dynamic finder names such as `findFirstByNameAndStatus`.
//!
//! A finder name has the shape `find[First|All]By<Field>[(And|Or)<Field>]*`.
//! `And` and `Or` are never mixed in one name. Field names are lower-camel-cased
//! before they become condition keys and are paired positionally with the
//! call arguments.
//!
//! `By`, `And` and `Or` only act as separators where they start a new
//! camel-case word: not at the start of the segment, and followed by an
//! uppercase letter or digit. `findByOrderId` therefore queries `orderId`, and
//! `findByNameAndstatus` queries a single field `nameAndstatus` rather than
//! `name` and `status`.
//!
//! A `First` anywhere in the method name, field names included, makes the
//! finder return only the first match. `findByFirstName` is such a finder.

use crate::domain::model::{Fields, QueryType};
use crate::utils::error::{ModelError, Result};
use serde_json::Value;
use std::str::FromStr;

const VERB: &str = "find";
const BY: &str = "By";
const AND: &str = "And";
const OR: &str = "Or";
const FIRST: &str = "First";
const ALL: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinderModifier {
    First,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicFinder {
    method: String,
    modifier: Option<FinderModifier>,
    fields: Vec<String>,
    query_type: QueryType,
}

impl DynamicFinder {
    pub fn parse(method: &str) -> Result<Self> {
        let unsupported = |reason: &str| ModelError::UnsupportedFinder {
            method: method.to_string(),
            reason: reason.to_string(),
        };

        let by = word_boundaries(method, BY)
            .first()
            .copied()
            .ok_or_else(|| unsupported("missing 'By' separator"))?;
        let (prefix, suffix) = (&method[..by], &method[by + BY.len()..]);

        let verb = prefix.replace(FIRST, "").replace(ALL, "");
        if verb != VERB {
            return Err(unsupported("only 'find' finders are supported"));
        }

        // modifiers are looked up across the whole name, field names included
        let modifier = if method.contains(FIRST) {
            Some(FinderModifier::First)
        } else if method.contains(ALL) {
            Some(FinderModifier::All)
        } else {
            None
        };

        let and_fields = split_words(suffix, AND);
        let (raw_fields, query_type) = if and_fields.len() > 1 {
            (and_fields, QueryType::And)
        } else {
            let or_fields = split_words(suffix, OR);
            if or_fields.len() > 1 {
                (or_fields, QueryType::Or)
            } else {
                (vec![suffix], QueryType::And)
            }
        };

        if raw_fields.iter().any(|field| field.is_empty()) {
            return Err(unsupported("empty field name"));
        }

        Ok(Self {
            method: method.to_string(),
            modifier,
            fields: raw_fields.into_iter().map(lower_first).collect(),
            query_type,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn modifier(&self) -> Option<FinderModifier> {
        self.modifier
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    pub fn returns_first(&self) -> bool {
        self.modifier == Some(FinderModifier::First)
    }

    /// Pairs each field with the argument at the same position. Extra arguments are ignored.
    pub fn conditions(&self, args: &[Value]) -> Result<Fields> {
        let mut conditions = Fields::new();
        for (position, field) in self.fields.iter().enumerate() {
            let value = args
                .get(position)
                .ok_or_else(|| ModelError::MissingFinderArgument {
                    method: self.method.clone(),
                    field: field.clone(),
                    position,
                })?;
            conditions.insert(field.clone(), value.clone());
        }
        Ok(conditions)
    }
}

impl FromStr for DynamicFinder {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        DynamicFinder::parse(s)
    }
}

/// Byte offsets where `token` starts a new camel-case word: not at the start,
/// and followed by an uppercase letter or digit.
fn word_boundaries(s: &str, token: &str) -> Vec<usize> {
    s.match_indices(token)
        .map(|(index, _)| index)
        .filter(|&index| {
            index > 0
                && s[index + token.len()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        })
        .collect()
}

fn split_words<'a>(s: &'a str, token: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for index in word_boundaries(s, token) {
        parts.push(&s[start..index]);
        start = index + token.len();
    }
    parts.push(&s[start..]);
    parts
}

fn lower_first(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
