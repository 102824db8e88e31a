use crate::adapters::memory::MemoryStore;
use crate::domain::model::{Fields, QueryType, RecordId, SortOrder};
use crate::domain::ports::ContentStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Store persisted as a JSON array of records. The whole file is rewritten
/// after every successful mutation.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens `path`. A missing or empty file starts an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records: Vec<Fields> = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Data file {} not found, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("Opened {} with {} records", path.display(), records.len());
        Ok(Self {
            path,
            inner: MemoryStore::with_records(records),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the current records. Callers hold `write_lock`.
    async fn flush(&self) -> Result<()> {
        let records = self.inner.snapshot().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_vec_pretty(&records)?;
        tokio::fs::write(&self.path, data).await?;
        tracing::debug!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    /// Flushes. When the write fails, memory is reset to `before`.
    async fn flush_or_restore(&self, before: Vec<Fields>) -> Result<()> {
        if let Err(e) = self.flush().await {
            tracing::warn!("Failed to write {}: {}", self.path.display(), e);
            self.inner.restore(before).await;
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for JsonFileStore {
    async fn load(&self, id: &RecordId) -> Result<Fields> {
        self.inner.load(id).await
    }

    async fn query(
        &self,
        conditions: &Fields,
        query_type: QueryType,
        sort_field: Option<&str>,
        sort_order: Option<SortOrder>,
    ) -> Result<Vec<Fields>> {
        self.inner
            .query(conditions, query_type, sort_field, sort_order)
            .await
    }

    async fn create(&self, type_name: &str, values: &Fields) -> Result<Fields> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot().await;
        let record = self.inner.create(type_name, values).await?;
        self.flush_or_restore(before).await?;
        Ok(record)
    }

    async fn update(&self, id: &RecordId, values: &Fields) -> Result<Fields> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot().await;
        let record = self.inner.update(id, values).await?;
        self.flush_or_restore(before).await?;
        Ok(record)
    }

    async fn delete(&self, id: &RecordId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot().await;
        let deleted = self.inner.delete(id).await?;
        if deleted {
            self.flush_or_restore(before).await?;
        }
        Ok(deleted)
    }
}
