use crate::adapters::{JsonFileStore, MemoryStore};
use crate::domain::model::{QueryType, SortOrder};
use crate::domain::ports::SharedStore;
use crate::utils::error::{ModelError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

const BACKENDS: [&str; 2] = ["memory", "file"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub query: QueryConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    pub path: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
        }
    }
}

fn default_backend() -> String {
    "memory".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryConfig {
    pub default_query_type: Option<QueryType>,
    pub default_sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl AppConfig {
    /// Loads and parses a TOML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ModelError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ModelError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ModelError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn query_type(&self) -> QueryType {
        self.query.default_query_type.unwrap_or_default()
    }

    pub fn sort_order(&self) -> Option<SortOrder> {
        self.query.default_sort_order
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    /// Builds the configured store.
    pub async fn open_store(&self) -> Result<SharedStore> {
        self.validate()?;
        match self.store.backend.to_ascii_lowercase().as_str() {
            "file" => {
                let path = validation::validate_required_field("store.path", &self.store.path)?;
                tracing::info!("Using JSON file store at {}", path);
                Ok(Arc::new(JsonFileStore::open(path).await?))
            }
            _ => {
                tracing::info!("Using in-memory store");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_one_of("store.backend", &self.store.backend, &BACKENDS)?;

        if self.store.backend.eq_ignore_ascii_case("file") {
            let path = validation::validate_required_field("store.path", &self.store.path)?;
            validation::validate_path("store.path", path)?;
        }

        if let Some(level) = self.log_level() {
            validation::validate_one_of(
                "logging.level",
                level,
                &["trace", "debug", "info", "warn", "error"],
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[store]
backend = "file"
path = "./data/content.json"

[query]
default_query_type = "OR"
default_sort_order = "DESC"

[logging]
level = "debug"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.store.backend, "file");
        assert_eq!(config.store.path.as_deref(), Some("./data/content.json"));
        assert_eq!(config.query_type(), QueryType::Or);
        assert_eq!(config.sort_order(), Some(SortOrder::Desc));
        assert_eq!(config.log_level(), Some("debug"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.store.backend, "memory");
        assert_eq!(config.query_type(), QueryType::And);
        assert_eq!(config.sort_order(), None);
        assert!(!config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CONTENT_MODEL_TEST_DATA", "/tmp/content-model.json");

        let toml_content = r#"
[store]
backend = "file"
path = "${CONTENT_MODEL_TEST_DATA}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.store.path.as_deref(),
            Some("/tmp/content-model.json")
        );

        std::env::remove_var("CONTENT_MODEL_TEST_DATA");
    }

    #[test]
    fn test_config_validation() {
        let unknown_backend = AppConfig::from_toml_str("[store]\nbackend = \"redis\"\n").unwrap();
        assert!(unknown_backend.validate().is_err());

        let missing_path = AppConfig::from_toml_str("[store]\nbackend = \"file\"\n").unwrap();
        assert!(matches!(
            missing_path.validate(),
            Err(ModelError::MissingConfigError { .. })
        ));

        let bad_level = AppConfig::from_toml_str("[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(bad_level.validate().is_err());
    }

    #[test]
    fn test_invalid_query_type_fails_parsing() {
        let result = AppConfig::from_toml_str("[query]\ndefault_query_type = \"XOR\"\n");
        assert!(matches!(result, Err(ModelError::ConfigError { .. })));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[store]\nbackend = \"memory\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.store.backend, "memory");
    }

    #[tokio::test]
    async fn test_open_file_store() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            store: StoreConfig {
                backend: "file".to_string(),
                path: Some(
                    temp_dir
                        .path()
                        .join("content.json")
                        .to_string_lossy()
                        .into_owned(),
                ),
            },
            ..Default::default()
        };

        let store = config.open_store().await.unwrap();
        store
            .create("Post", &crate::domain::model::Fields::new())
            .await
            .unwrap();
        assert!(temp_dir.path().join("content.json").exists());
    }
}
