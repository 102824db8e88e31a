pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{JsonFileStore, MemoryStore};
pub use config::AppConfig;
pub use core::{
    ContentModel, ContentStore, ContentType, DynamicFinder, Fields, FindArgs, Found, ModelClass,
    QueryType, RecordId, SharedStore, SortOrder,
};
pub use utils::error::{ModelError, Result};
