pub mod finder;
pub mod model;

pub use crate::domain::model::{Fields, QueryType, RecordId, SortOrder};
pub use crate::domain::ports::{ContentStore, SharedStore};
pub use crate::utils::error::Result;
pub use finder::{DynamicFinder, FinderModifier};
pub use model::{ContentModel, ContentType, FindArgs, Found, ModelClass};
