use crate::config::AppConfig;
use crate::domain::model::{Fields, RecordId, SortOrder};
use crate::utils::error::{ModelError, Result};
use crate::utils::validation::{self, Validate};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "content-model")]
#[command(about = "Find and edit content records through the model layer")]
pub struct CliConfig {
    #[arg(long, help = "TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "JSON data file, overrides the configured store")]
    pub data: Option<String>,

    #[arg(long = "type", short = 't', help = "Content type to operate on")]
    pub type_name: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Load one record by id
    Find { id: String },
    /// Query records by field=value conditions
    Where {
        #[arg(required = true)]
        conditions: Vec<String>,
        #[arg(long, help = "Match any condition instead of all")]
        or: bool,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        order: Option<SortOrder>,
    },
    /// Run a dynamic finder, e.g. `call findFirstByNameAndStatus alice active`
    Call { method: String, args: Vec<String> },
    /// Create a record from field=value pairs
    Create { fields: Vec<String> },
    /// Update fields of an existing record
    Update {
        id: String,
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Delete a record by id
    Delete { id: String },
}

impl CliConfig {
    /// Config file settings with command-line overrides applied.
    pub fn app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(data) = &self.data {
            config.store.backend = "file".to_string();
            config.store.path = Some(data.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("type", &self.type_name)?;
        if let Some(data) = &self.data {
            validation::validate_path("data", data)?;
        }
        Ok(())
    }
}

/// Parses a command-line value as JSON, falling back to a plain string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Integers become numeric ids, anything else is taken as a key verbatim.
pub fn parse_record_id(raw: &str) -> RecordId {
    raw.parse::<i64>()
        .map(RecordId::Numeric)
        .unwrap_or_else(|_| RecordId::from(raw))
}

pub fn parse_assignments(pairs: &[String]) -> Result<Fields> {
    let mut fields = Fields::new();
    for pair in pairs {
        let (name, raw) = pair
            .split_once('=')
            .ok_or_else(|| ModelError::InvalidConfigValueError {
                field: "fields".to_string(),
                value: pair.clone(),
                reason: "Expected field=value".to_string(),
            })?;
        validation::validate_non_empty_string("fields", name)?;
        fields.insert(name.to_string(), parse_value(raw));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("alice"), json!("alice"));
        assert_eq!(parse_value(r#"{"a":1}"#), json!({"a": 1}));
    }

    #[test]
    fn test_parse_record_id() {
        assert_eq!(parse_record_id("42"), RecordId::Numeric(42));
        assert_eq!(parse_record_id("true"), RecordId::from("true"));
        assert_eq!(parse_record_id("1.5"), RecordId::from("1.5"));
        assert_eq!(
            parse_record_id("6f1c2a9e-0d1b-4e55-9a37-2f0e7c1d9b10"),
            RecordId::from("6f1c2a9e-0d1b-4e55-9a37-2f0e7c1d9b10")
        );
    }

    #[tokio::test]
    async fn test_find_by_non_json_id() {
        use crate::adapters::MemoryStore;
        use crate::core::{FindArgs, ModelClass, QueryType};
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::with_records(vec![
            parse_assignments(&["uuid=\"true\"".to_string(), "type=Post".to_string()]).unwrap(),
        ]));
        let posts = ModelClass::named(store, "Post");

        let found = posts
            .find(FindArgs::Id(parse_record_id("true")), QueryType::And, None, None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_parse_assignments() {
        let fields = parse_assignments(&["name=alice".to_string(), "age=31".to_string()]).unwrap();
        assert_eq!(json!(fields), json!({"name": "alice", "age": 31}));

        assert!(parse_assignments(&["broken".to_string()]).is_err());
        assert!(parse_assignments(&["=value".to_string()]).is_err());
    }

    #[test]
    fn test_cli_parsing_and_overrides() {
        let cli = CliConfig::parse_from([
            "content-model",
            "--type",
            "Post",
            "--data",
            "/tmp/posts.json",
            "where",
            "status=draft",
            "--or",
            "--order",
            "desc",
        ]);

        assert_eq!(cli.type_name, "Post");
        assert!(cli.validate().is_ok());
        match &cli.command {
            Command::Where { conditions, or, order, .. } => {
                assert_eq!(conditions, &["status=draft"]);
                assert!(*or);
                assert_eq!(*order, Some(SortOrder::Desc));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let config = cli.app_config().unwrap();
        assert_eq!(config.store.backend, "file");
        assert_eq!(config.store.path.as_deref(), Some("/tmp/posts.json"));
    }
}
