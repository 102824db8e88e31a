use crate::domain::model::{Fields, QueryType, RecordId, SortOrder, TYPE_FIELD, UUID_FIELD};
use crate::domain::ports::ContentStore;
use crate::utils::error::{ModelError, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::cmp::Ordering;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const CREATED_FIELD: &str = "created";
pub const MODIFIED_FIELD: &str = "modified";

/// Fields managed by the store. Caller values never overwrite them.
const PROTECTED_FIELDS: [&str; 4] = [UUID_FIELD, TYPE_FIELD, CREATED_FIELD, MODIFIED_FIELD];

/// In-process store. Records keep their insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Fields>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store. Records without a uuid get a fresh one.
    pub fn with_records(records: Vec<Fields>) -> Self {
        let records = records
            .into_iter()
            .map(|mut record| {
                if record_key(&record).is_none() {
                    record.insert(UUID_FIELD.to_string(), Value::String(new_uuid()));
                }
                record
            })
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn snapshot(&self) -> Vec<Fields> {
        self.records.read().await.clone()
    }

    /// Replaces every record, e.g. to restore an earlier snapshot.
    pub async fn restore(&self, records: Vec<Fields>) {
        *self.records.write().await = records;
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn load(&self, id: &RecordId) -> Result<Fields> {
        let key = id.to_string();
        let records = self.records.read().await;
        records
            .iter()
            .find(|record| record_key(record).as_deref() == Some(key.as_str()))
            .cloned()
            .ok_or(ModelError::NotFound { id: key })
    }

    async fn query(
        &self,
        conditions: &Fields,
        query_type: QueryType,
        sort_field: Option<&str>,
        sort_order: Option<SortOrder>,
    ) -> Result<Vec<Fields>> {
        let type_filter = conditions.get(TYPE_FIELD);
        let field_conditions: Vec<(&String, &Value)> = conditions
            .iter()
            .filter(|(field, _)| field.as_str() != TYPE_FIELD)
            .collect();

        let records = self.records.read().await;
        let mut matched: Vec<Fields> = records
            .iter()
            .filter(|record| type_filter.map_or(true, |t| record.get(TYPE_FIELD) == Some(t)))
            .filter(|record| {
                if field_conditions.is_empty() {
                    return true;
                }
                let check = |(field, value): &(&String, &Value)| record.get(*field) == Some(*value);
                match query_type {
                    QueryType::And => field_conditions.iter().all(check),
                    QueryType::Or => field_conditions.iter().any(check),
                }
            })
            .cloned()
            .collect();
        drop(records);

        if let Some(field) = sort_field {
            let order = sort_order.unwrap_or_default();
            matched.sort_by(|a, b| match (a.get(field), b.get(field)) {
                (Some(x), Some(y)) => match order {
                    SortOrder::Asc => compare_values(x, y),
                    SortOrder::Desc => compare_values(y, x),
                },
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }

        Ok(matched)
    }

    async fn create(&self, type_name: &str, values: &Fields) -> Result<Fields> {
        let now = Value::String(Utc::now().to_rfc3339());
        let mut record = Fields::new();
        record.insert(UUID_FIELD.to_string(), Value::String(new_uuid()));
        record.insert(TYPE_FIELD.to_string(), Value::String(type_name.to_string()));
        merge_unprotected(&mut record, values);
        record.insert(CREATED_FIELD.to_string(), now.clone());
        record.insert(MODIFIED_FIELD.to_string(), now);

        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &RecordId, values: &Fields) -> Result<Fields> {
        let key = id.to_string();
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|record| record_key(record).as_deref() == Some(key.as_str()))
            .ok_or(ModelError::NotFound { id: key })?;

        merge_unprotected(record, values);
        record.insert(
            MODIFIED_FIELD.to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        Ok(record.clone())
    }

    async fn delete(&self, id: &RecordId) -> Result<bool> {
        let key = id.to_string();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|record| record_key(record).as_deref() != Some(key.as_str()));
        Ok(records.len() < before)
    }
}

fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}

fn record_key(record: &Fields) -> Option<String> {
    match record.get(UUID_FIELD)? {
        Value::String(key) => Some(key.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn merge_unprotected(record: &mut Fields, values: &Fields) {
    for (field, value) in values {
        if !PROTECTED_FIELDS.contains(&field.as_str()) {
            record.insert(field.clone(), value.clone());
        }
    }
}

/// Total order over JSON values: null < bool < number < string < array/object.
/// Numbers compare numerically, everything else by its string form.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    kind_rank(a).cmp(&kind_rank(b)).then_with(|| match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(_), Value::Number(_)) => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        _ => sort_key(a).cmp(&sort_key(b)),
    })
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) | Value::Object(_) => 4,
    }
}

fn sort_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
