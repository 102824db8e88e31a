use crate::domain::model::{Fields, QueryType, RecordId, SortOrder};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Persistence collaborator behind every model. Owns the authoritative records.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn load(&self, id: &RecordId) -> Result<Fields>;

    async fn query(
        &self,
        conditions: &Fields,
        query_type: QueryType,
        sort_field: Option<&str>,
        sort_order: Option<SortOrder>,
    ) -> Result<Vec<Fields>>;

    async fn create(&self, type_name: &str, values: &Fields) -> Result<Fields>;

    async fn update(&self, id: &RecordId, values: &Fields) -> Result<Fields>;

    async fn delete(&self, id: &RecordId) -> Result<bool>;
}

pub type SharedStore = Arc<dyn ContentStore>;
