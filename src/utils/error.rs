use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid find arguments: expected an id or a condition map, got {found}")]
    InvalidFindArgs { found: String },

    #[error("Model of type '{type_name}' has not been persisted")]
    NotPersisted { type_name: String },

    #[error("Persisted model of type '{type_name}' has no uuid")]
    MissingUuid { type_name: String },

    #[error("Store refused to delete record {uuid}")]
    DeleteFailed { uuid: String },

    #[error("Unsupported finder '{method}': {reason}")]
    UnsupportedFinder { method: String, reason: String },

    #[error("Finder '{method}' has no argument for field '{field}' at position {position}")]
    MissingFinderArgument {
        method: String,
        field: String,
        position: usize,
    },

    #[error("Finder '{method}' matched no records")]
    NoMatch { method: String },

    #[error("Record not found: {id}")]
    NotFound { id: String },

    #[error("Store error: {message}")]
    StoreError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },
}

impl ModelError {
    /// True when the failure came from the model's own state rather than the store.
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            ModelError::NotPersisted { .. } | ModelError::MissingUuid { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
