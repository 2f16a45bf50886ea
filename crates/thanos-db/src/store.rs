//! Model storage.
//!
//! [`ModelStore`] is the async interface the console reads and writes records
//! through. [`InMemoryStore`] keeps one table per model behind a `RwLock` and
//! is used by the demo and the tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use thanos_core::{ThanosError, ThanosResult};

use crate::filter::Filter;
use crate::model::ModelMeta;
use crate::record::Record;
use crate::value::Value;

/// Async CRUD interface over records of registered models.
///
/// Every call is a single operation; there are no transactions.
#[async_trait::async_trait]
pub trait ModelStore: Send + Sync {
    /// Returns the records matching `filter`, ordered by primary key.
    async fn filter(&self, meta: &ModelMeta, filter: &Filter) -> ThanosResult<Vec<Record>>;

    /// Returns the record with primary key `pk`, if any.
    async fn get(&self, meta: &ModelMeta, pk: i64) -> ThanosResult<Option<Record>>;

    /// Inserts a record and returns it with its primary key set.
    async fn create(&self, meta: &ModelMeta, values: Record) -> ThanosResult<Record>;

    /// Overwrites the given fields of record `pk` and returns the result.
    ///
    /// Fails with [`ThanosError::DoesNotExist`] when there is no such record.
    async fn update(&self, meta: &ModelMeta, pk: i64, values: Record) -> ThanosResult<Record>;

    /// Deletes record `pk`, returning how many records were removed.
    async fn delete(&self, meta: &ModelMeta, pk: i64) -> ThanosResult<usize>;

    /// Counts the records matching `filter`.
    async fn count(&self, meta: &ModelMeta, filter: &Filter) -> ThanosResult<usize> {
        Ok(self.filter(meta, filter).await?.len())
    }
}

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Record>,
}

/// A process-local [`ModelStore`].
///
/// # Examples
///
/// ```
/// use thanos_db::fields::{FieldDef, FieldType};
/// use thanos_db::filter::Filter;
/// use thanos_db::model::ModelMeta;
/// use thanos_db::record::Record;
/// use thanos_db::store::{InMemoryStore, ModelStore};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let meta = ModelMeta::new("crm", "customer")
///     .field(FieldDef::new("name", FieldType::CharField));
/// let store = InMemoryStore::new();
///
/// let created = store.create(&meta, Record::new().with("name", "Ann")).await.unwrap();
/// assert_eq!(created.pk(&meta), Some(1));
/// assert_eq!(store.filter(&meta, &Filter::all()).await.unwrap().len(), 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ThanosResult<RwLockReadGuard<'_, HashMap<String, Table>>> {
        self.tables
            .read()
            .map_err(|_| ThanosError::DatabaseError("store lock poisoned".to_string()))
    }

    fn write(&self) -> ThanosResult<RwLockWriteGuard<'_, HashMap<String, Table>>> {
        self.tables
            .write()
            .map_err(|_| ThanosError::DatabaseError("store lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl ModelStore for InMemoryStore {
    async fn filter(&self, meta: &ModelMeta, filter: &Filter) -> ThanosResult<Vec<Record>> {
        let tables = self.read()?;
        Ok(tables
            .get(&meta.model_key())
            .map(|table| {
                table
                    .rows
                    .values()
                    .filter(|record| filter.matches(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, meta: &ModelMeta, pk: i64) -> ThanosResult<Option<Record>> {
        let tables = self.read()?;
        Ok(tables
            .get(&meta.model_key())
            .and_then(|table| table.rows.get(&pk))
            .cloned())
    }

    async fn create(&self, meta: &ModelMeta, values: Record) -> ThanosResult<Record> {
        let mut record = Record::new();
        for field in meta.fields() {
            if let Some(default) = &field.default {
                record.set(field.name.clone(), default.clone());
            } else if field.null && !field.primary_key {
                record.set(field.name.clone(), Value::Null);
            }
        }
        record.merge(values);

        let mut tables = self.write()?;
        let table = tables.entry(meta.model_key()).or_default();
        let pk = match record.pk(meta) {
            Some(pk) if table.rows.contains_key(&pk) => {
                return Err(ThanosError::DatabaseError(format!(
                    "{} with {} {pk} already exists",
                    meta.model_key(),
                    meta.pk_name()
                )));
            }
            Some(pk) => pk,
            None => table.next_id + 1,
        };
        table.next_id = table.next_id.max(pk);
        record.set(meta.pk_name().to_string(), pk);
        table.rows.insert(pk, record.clone());

        tracing::debug!(model = %meta.model_key(), pk, "record created");
        Ok(record)
    }

    async fn update(&self, meta: &ModelMeta, pk: i64, mut values: Record) -> ThanosResult<Record> {
        let mut tables = self.write()?;
        let record = tables
            .get_mut(&meta.model_key())
            .and_then(|table| table.rows.get_mut(&pk))
            .ok_or_else(|| {
                ThanosError::DoesNotExist(format!(
                    "{} with {} {pk}",
                    meta.model_key(),
                    meta.pk_name()
                ))
            })?;

        values.remove(meta.pk_name());
        record.merge(values);

        tracing::debug!(model = %meta.model_key(), pk, "record updated");
        Ok(record.clone())
    }

    async fn delete(&self, meta: &ModelMeta, pk: i64) -> ThanosResult<usize> {
        let mut tables = self.write()?;
        let removed = tables
            .get_mut(&meta.model_key())
            .and_then(|table| table.rows.remove(&pk))
            .map_or(0, |_| 1);

        tracing::debug!(model = %meta.model_key(), pk, removed, "record delete");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldDef, FieldType};

    fn meta() -> ModelMeta {
        ModelMeta::new("crm", "customer")
            .field(FieldDef::new("name", FieldType::CharField))
            .field(FieldDef::new("age", FieldType::IntegerField).nullable())
            .field(FieldDef::new("vip", FieldType::BooleanField).default(false))
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = InMemoryStore::new();
        let meta = meta();
        let a = store.create(&meta, Record::new().with("name", "A")).await.unwrap();
        let b = store.create(&meta, Record::new().with("name", "B")).await.unwrap();
        assert_eq!(a.pk(&meta), Some(1));
        assert_eq!(b.pk(&meta), Some(2));
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let store = InMemoryStore::new();
        let meta = meta();
        let record = store.create(&meta, Record::new().with("name", "A")).await.unwrap();
        assert_eq!(record.get("vip"), Some(&Value::Bool(false)));
        assert_eq!(record.get("age"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_create_with_explicit_pk() {
        let store = InMemoryStore::new();
        let meta = meta();
        store.create(&meta, Record::new().with("id", 10)).await.unwrap();
        let next = store.create(&meta, Record::new()).await.unwrap();
        assert_eq!(next.pk(&meta), Some(11));
        assert!(matches!(
            store.create(&meta, Record::new().with("id", 10)).await,
            Err(ThanosError::DatabaseError(_))
        ));
    }

    #[tokio::test]
    async fn test_filter_orders_by_pk() {
        let store = InMemoryStore::new();
        let meta = meta();
        for (id, age) in [(3, 20), (1, 30), (2, 20)] {
            store
                .create(&meta, Record::new().with("id", id).with("age", age))
                .await
                .unwrap();
        }
        let filter = Filter::all().and("age", 20);
        let found = store.filter(&meta, &filter).await.unwrap();
        let ids: Vec<_> = found.iter().filter_map(|r| r.pk(&meta)).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(store.count(&meta, &Filter::all()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_filter_unknown_table_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.filter(&meta(), &Filter::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_and_keeps_pk() {
        let store = InMemoryStore::new();
        let meta = meta();
        store
            .create(&meta, Record::new().with("name", "A").with("age", 5))
            .await
            .unwrap();
        let updated = store
            .update(&meta, 1, Record::new().with("id", 99).with("name", "B"))
            .await
            .unwrap();
        assert_eq!(updated.pk(&meta), Some(1));
        assert_eq!(updated.get("name"), Some(&Value::from("B")));
        assert_eq!(updated.get("age"), Some(&Value::Int(5)));
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.update(&meta(), 1, Record::new()).await,
            Err(ThanosError::DoesNotExist(_))
        ));
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let store = InMemoryStore::new();
        let meta = meta();
        store.create(&meta, Record::new().with("name", "A")).await.unwrap();
        assert!(store.get(&meta, 1).await.unwrap().is_some());
        assert_eq!(store.delete(&meta, 1).await.unwrap(), 1);
        assert_eq!(store.delete(&meta, 1).await.unwrap(), 0);
        assert!(store.get(&meta, 1).await.unwrap().is_none());
    }
}
