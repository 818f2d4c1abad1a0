use crate::{
    codec::{Direction, EncodedKey, KeyWriter, encode_value},
    error::InternalError,
    model::{index::IndexSpec, schema::RecordSchema},
    store::{BackendError, Cursor, IndexEntry, KeyRange, Record, StorageBackend, VecCursor},
    value::Value,
};
use parking_lot::RwLock;
use std::{collections::BTreeMap, sync::Arc};
use tracing::trace;

///
/// MemoryBackend
///
/// Reference backend holding records and every schema index in ordered
/// maps. Scans copy the matching entries under the read lock and iterate
/// the copy, so a cursor never observes later writes.
///

pub struct MemoryBackend<R> {
    schema: Arc<RecordSchema>,
    inner: RwLock<MemoryInner<R>>,
}

struct MemoryInner<R> {
    records: BTreeMap<EncodedKey, R>,
    // per index: (entry key, primary key) -> record
    indexes: BTreeMap<String, BTreeMap<(EncodedKey, EncodedKey), R>>,
}

impl<R> MemoryBackend<R>
where
    R: Record + Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        let indexes = schema
            .indexes
            .iter()
            .map(|index| (index.name.clone(), BTreeMap::new()))
            .collect();

        Self {
            schema,
            inner: RwLock::new(MemoryInner {
                records: BTreeMap::new(),
                indexes,
            }),
        }
    }

    #[must_use]
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn primary_key_of(&self, record: &R) -> Result<EncodedKey, InternalError> {
        let mut out = Vec::new();
        for property in &self.schema.primary_key {
            let model = self.schema.require_property(property)?;
            let value = record.value(property).unwrap_or(Value::Null);
            encode_value(
                &value,
                model.kind,
                model.nullable,
                &mut KeyWriter::new(&mut out, Direction::Asc),
            )?;
        }

        Ok(EncodedKey::new(out))
    }

    /// Insert or replace the record with the same primary key.
    ///
    /// Unique indexes reject a second record with an equal entry key.
    pub fn insert(&self, record: R) -> Result<(), InternalError> {
        let primary_key = self.primary_key_of(&record)?;
        let entry_keys = self
            .schema
            .indexes
            .iter()
            .map(|index| Ok((index, index.encode_entry_key(&self.schema, &record)?)))
            .collect::<Result<Vec<_>, InternalError>>()?;

        let mut inner = self.inner.write();
        for (index, entry_key) in &entry_keys {
            if !index.unique {
                continue;
            }
            let conflict = inner.indexes.get(&index.name).is_some_and(|entries| {
                entries
                    .range((entry_key.clone(), EncodedKey::default())..)
                    .take_while(|((key, _), _)| key == entry_key)
                    .any(|((_, pk), _)| *pk != primary_key)
            });
            if conflict {
                return Err(BackendError::new(format!(
                    "unique index '{}' already holds key {entry_key:?}",
                    index.name
                ))
                .into());
            }
        }

        inner.remove_entries(&self.schema, &primary_key)?;
        for (index, entry_key) in entry_keys {
            if let Some(entries) = inner.indexes.get_mut(&index.name) {
                entries.insert((entry_key, primary_key.clone()), record.clone());
            }
        }
        inner.records.insert(primary_key, record);

        Ok(())
    }

    /// Remove the record whose primary key matches `record`, if present.
    pub fn remove(&self, record: &R) -> Result<bool, InternalError> {
        let primary_key = self.primary_key_of(record)?;
        let mut inner = self.inner.write();

        inner.remove_entries(&self.schema, &primary_key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Record + Clone> MemoryInner<R> {
    fn remove_entries(
        &mut self,
        schema: &RecordSchema,
        primary_key: &EncodedKey,
    ) -> Result<bool, InternalError> {
        let Some(existing) = self.records.remove(primary_key) else {
            return Ok(false);
        };

        for index in &schema.indexes {
            let entry_key = index.encode_entry_key(schema, &existing)?;
            if let Some(entries) = self.indexes.get_mut(&index.name) {
                entries.remove(&(entry_key, primary_key.clone()));
            }
        }

        Ok(true)
    }
}

impl<R> StorageBackend<R> for MemoryBackend<R>
where
    R: Record + Clone + Send + Sync + 'static,
{
    fn scan(
        &self,
        index: &IndexSpec,
        range: &KeyRange,
        reverse: bool,
    ) -> Result<Box<dyn Cursor<IndexEntry<R>>>, BackendError> {
        let inner = self.inner.read();
        let entries = inner
            .indexes
            .get(&index.name)
            .ok_or_else(|| BackendError::new(format!("unknown index '{}'", index.name)))?;

        let mut snapshot: Vec<IndexEntry<R>> = entries
            .range((range.prefix.clone(), EncodedKey::default())..)
            .take_while(|((key, _), _)| key.starts_with(&range.prefix))
            .filter(|((key, _), _)| range.contains(key))
            .map(|((key, _), record)| IndexEntry {
                key: key.clone(),
                record: record.clone(),
            })
            .collect();
        drop(inner);

        if reverse {
            snapshot.reverse();
        }
        trace!(index = %index.name, entries = snapshot.len(), reverse, "memory index scan");

        Ok(Box::new(VecCursor::new(snapshot)))
    }

    fn full_scan(&self) -> Result<Box<dyn Cursor<R>>, BackendError> {
        let snapshot: Vec<R> = self.inner.read().records.values().cloned().collect();
        trace!(records = snapshot.len(), "memory full scan");

        Ok(Box::new(VecCursor::new(snapshot)))
    }
}
