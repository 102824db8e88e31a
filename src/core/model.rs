use crate::core::finder::DynamicFinder;
use crate::domain::model::{Fields, QueryType, RecordId, SortOrder, TYPE_FIELD, UUID_FIELD};
use crate::domain::ports::SharedStore;
use crate::utils::error::{ModelError, Result};
use serde_json::Value;
use std::fmt;

/// Names the store collection a Rust type maps to.
///
/// The default is the type's own short name, so `crate::models::Post` maps to
/// `"Post"`. Override `type_name` when the store uses another tag.
pub trait ContentType {
    fn type_name() -> String {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Last path segment of a fully qualified type name, without generic arguments.
pub fn short_type_name(full_name: &str) -> String {
    let without_generics = full_name.split('<').next().unwrap_or(full_name);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .to_string()
}

/// Argument accepted by [`ModelClass::find`].
#[derive(Debug, Clone, PartialEq)]
pub enum FindArgs {
    Id(RecordId),
    Conditions(Fields),
    /// Anything that is neither an id nor a condition map. `find` rejects it.
    Invalid(Value),
}

impl From<Value> for FindArgs {
    fn from(value: Value) -> Self {
        match value {
            Value::String(key) => FindArgs::Id(RecordId::Key(key)),
            Value::Number(n) => match n.as_i64() {
                Some(id) => FindArgs::Id(RecordId::Numeric(id)),
                None if n.is_u64() => FindArgs::Id(RecordId::Key(n.to_string())),
                None => FindArgs::Invalid(Value::Number(n)),
            },
            Value::Object(conditions) => FindArgs::Conditions(conditions),
            other => FindArgs::Invalid(other),
        }
    }
}

impl From<RecordId> for FindArgs {
    fn from(id: RecordId) -> Self {
        FindArgs::Id(id)
    }
}

impl From<&str> for FindArgs {
    fn from(id: &str) -> Self {
        FindArgs::Id(RecordId::from(id))
    }
}

impl From<i64> for FindArgs {
    fn from(id: i64) -> Self {
        FindArgs::Id(RecordId::Numeric(id))
    }
}

impl From<Fields> for FindArgs {
    fn from(conditions: Fields) -> Self {
        FindArgs::Conditions(conditions)
    }
}

/// Result of a find: a single record for id lookups, a list for queries.
#[derive(Debug, Clone)]
pub enum Found {
    One(ContentModel),
    Many(Vec<ContentModel>),
}

impl Found {
    pub fn into_vec(self) -> Vec<ContentModel> {
        match self {
            Found::One(model) => vec![model],
            Found::Many(models) => models,
        }
    }

    pub fn into_first(self) -> Option<ContentModel> {
        self.into_vec().into_iter().next()
    }

    pub fn len(&self) -> usize {
        match self {
            Found::One(_) => 1,
            Found::Many(models) => models.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Type-level operations for one content type, bound to a store.
#[derive(Clone)]
pub struct ModelClass {
    store: SharedStore,
    type_name: String,
}

impl ModelClass {
    pub fn of<T: ContentType + ?Sized>(store: SharedStore) -> Self {
        Self::named(store, T::type_name())
    }

    pub fn named(store: SharedStore, type_name: impl Into<String>) -> Self {
        Self {
            store,
            type_name: type_name.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub async fn find(
        &self,
        args: impl Into<FindArgs>,
        query_type: QueryType,
        sort_field: Option<&str>,
        sort_order: Option<SortOrder>,
    ) -> Result<Found> {
        match args.into() {
            FindArgs::Id(id) => {
                tracing::debug!("Loading {} record {}", self.type_name, id);
                let values = self.store.load(&id).await?;
                Ok(Found::One(self.wrap(values)))
            }
            FindArgs::Conditions(mut conditions) => {
                conditions.insert(
                    TYPE_FIELD.to_string(),
                    Value::String(self.type_name.clone()),
                );
                tracing::debug!(
                    "Querying {} with {} conditions ({})",
                    self.type_name,
                    conditions.len(),
                    query_type
                );
                let rows = self
                    .store
                    .query(&conditions, query_type, sort_field, sort_order)
                    .await?;
                tracing::debug!("Query on {} returned {} rows", self.type_name, rows.len());
                Ok(Found::Many(
                    rows.into_iter().map(|row| self.wrap(row)).collect(),
                ))
            }
            FindArgs::Invalid(value) => Err(ModelError::InvalidFindArgs {
                found: describe_value(&value).to_string(),
            }),
        }
    }

    pub async fn find_by_id(&self, id: impl Into<RecordId>) -> Result<ContentModel> {
        match self
            .find(FindArgs::Id(id.into()), QueryType::And, None, None)
            .await?
        {
            Found::One(model) => Ok(model),
            Found::Many(models) => models.into_iter().next().ok_or_else(|| ModelError::StoreError {
                message: "id lookup returned no record".to_string(),
            }),
        }
    }

    pub async fn find_where(
        &self,
        conditions: Fields,
        query_type: QueryType,
    ) -> Result<Vec<ContentModel>> {
        Ok(self
            .find(FindArgs::Conditions(conditions), query_type, None, None)
            .await?
            .into_vec())
    }

    pub async fn update_attributes(&self, id: &RecordId, values: &Fields) -> Result<Fields> {
        tracing::debug!("Updating {} record {}", self.type_name, id);
        self.store.update(id, values).await
    }

    /// Fresh unsaved instance with no values.
    pub fn get_new(&self) -> ContentModel {
        ContentModel::new(self.store.clone(), self.type_name.clone(), false, Fields::new())
    }

    /// Creates and persists a record. Use [`ModelClass::get_new`] for an unsaved instance.
    pub async fn create(&self, values: Fields) -> Result<ContentModel> {
        tracing::debug!("Creating {} record", self.type_name);
        let created = self.store.create(&self.type_name, &values).await?;
        Ok(self.wrap(created))
    }

    /// Runs a dynamic finder such as `findFirstByNameAndStatus` with positional arguments.
    pub async fn call(&self, method: &str, args: &[Value]) -> Result<Found> {
        let finder = DynamicFinder::parse(method)?;
        let conditions = finder.conditions(args)?;
        tracing::debug!(
            "Dynamic finder {} on {} -> {:?} ({})",
            method,
            self.type_name,
            finder.fields(),
            finder.query_type()
        );

        let models = self
            .find(
                FindArgs::Conditions(conditions),
                finder.query_type(),
                None,
                None,
            )
            .await?
            .into_vec();

        if finder.returns_first() {
            models
                .into_iter()
                .next()
                .map(Found::One)
                .ok_or_else(|| ModelError::NoMatch {
                    method: method.to_string(),
                })
        } else {
            Ok(Found::Many(models))
        }
    }

    fn wrap(&self, values: Fields) -> ContentModel {
        ContentModel::new(self.store.clone(), self.type_name.clone(), true, values)
    }
}

impl fmt::Debug for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClass")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Client-side view of one record. The store owns the persisted copy.
#[derive(Clone)]
pub struct ContentModel {
    store: SharedStore,
    type_name: String,
    exists: bool,
    values: Fields,
}

impl ContentModel {
    pub fn new(
        store: SharedStore,
        type_name: impl Into<String>,
        exists: bool,
        values: Fields,
    ) -> Self {
        Self {
            store,
            type_name: type_name.into(),
            exists,
            values,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn uuid(&self) -> Option<RecordId> {
        match self.values.get(UUID_FIELD)? {
            Value::String(key) => Some(RecordId::Key(key.clone())),
            Value::Number(n) => n.as_i64().map(RecordId::Numeric),
            _ => None,
        }
    }

    pub fn class(&self) -> ModelClass {
        ModelClass::named(self.store.clone(), self.type_name.clone())
    }

    pub fn values(&self) -> &Fields {
        &self.values
    }

    /// Copy of the current values. Changes to it do not touch the model.
    pub fn get_values(&self) -> Fields {
        self.values.clone()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.values)?)
    }

    /// Updates the record when it exists, creates it otherwise. Values are
    /// replaced by what the store returns.
    pub async fn save(&mut self) -> Result<Fields> {
        let saved = if self.exists {
            let id = self.persisted_id()?;
            tracing::debug!("Saving {} record {}", self.type_name, id);
            self.store.update(&id, &self.values).await?
        } else {
            tracing::debug!("Saving new {} record", self.type_name);
            let created = self.store.create(&self.type_name, &self.values).await?;
            self.exists = true;
            created
        };
        self.values = saved.clone();
        Ok(saved)
    }

    /// Deletes the record from the store. In-memory values are kept.
    pub async fn delete(&mut self) -> Result<()> {
        let id = self.persisted_id()?;
        tracing::debug!("Deleting {} record {}", self.type_name, id);
        if self.store.delete(&id).await? {
            self.exists = false;
            Ok(())
        } else {
            tracing::warn!("Store did not delete {} record {}", self.type_name, id);
            Err(ModelError::DeleteFailed {
                uuid: id.to_string(),
            })
        }
    }

    pub async fn update(&mut self, values: Fields) -> Result<&mut Self> {
        let id = self.persisted_id()?;
        self.values = self.class().update_attributes(&id, &values).await?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.shift_remove(name)
    }

    fn persisted_id(&self) -> Result<RecordId> {
        if !self.exists {
            return Err(ModelError::NotPersisted {
                type_name: self.type_name.clone(),
            });
        }
        self.uuid().ok_or_else(|| ModelError::MissingUuid {
            type_name: self.type_name.clone(),
        })
    }
}

impl fmt::Display for ContentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.values).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl fmt::Debug for ContentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentModel")
            .field("type_name", &self.type_name)
            .field("exists", &self.exists)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a non-integer number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
