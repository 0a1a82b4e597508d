//! Keyed storage for relationship records.
//!
//! Every record lives behind its own `tokio::sync::Mutex`, so read-modify-write on one
//! pair never races another writer of the same pair while unrelated pairs proceed in
//! parallel. The index lock is only held long enough to look up or insert a handle.

use super::types::{RelationshipKey, RelationshipRecord};
use crate::Result;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared, individually locked record
pub type RecordHandle = Arc<Mutex<RelationshipRecord>>;

/// Storage backend for relationship records.
///
/// Implementations hand out per-record handles; callers lock a handle for the whole
/// read-modify-write cycle. Durability is the implementation's concern.
#[async_trait]
pub trait RelationshipStore: Send + Sync + Debug + 'static {
    /// Handle for the record with the given id
    async fn get(&self, id: &str) -> Result<Option<RecordHandle>>;

    /// Insert `record` unless its id is already present.
    ///
    /// Returns the stored handle and whether the record was newly inserted.
    async fn insert_if_absent(&self, record: RelationshipRecord) -> Result<(RecordHandle, bool)>;

    /// Handles of every record involving `character`, ordered by record id
    async fn list_for(&self, character: &str) -> Result<Vec<RecordHandle>>;

    /// Handles of every record, ordered by record id
    async fn list_all(&self) -> Result<Vec<RecordHandle>>;

    /// Handle for the record of an unordered pair
    async fn get_pair(&self, key: &RelationshipKey) -> Result<Option<RecordHandle>> {
        self.get(&key.record_id()).await
    }

    /// Number of stored records
    async fn count(&self) -> Result<usize> {
        Ok(self.list_all().await?.len())
    }
}

#[derive(Debug, Default)]
struct Index {
    records: HashMap<String, RecordHandle>,
    by_character: HashMap<String, BTreeSet<String>>,
}

impl Index {
    fn handles<'a>(&self, ids: impl Iterator<Item = &'a String>) -> Vec<RecordHandle> {
        ids.filter_map(|id| self.records.get(id).cloned()).collect()
    }
}

/// Process-local store; the default backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRelationshipStore {
    index: Arc<RwLock<Index>>,
}

impl InMemoryRelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RelationshipStore for InMemoryRelationshipStore {
    async fn get(&self, id: &str) -> Result<Option<RecordHandle>> {
        Ok(self.index.read().await.records.get(id).cloned())
    }

    async fn insert_if_absent(&self, record: RelationshipRecord) -> Result<(RecordHandle, bool)> {
        let mut index = self.index.write().await;

        if let Some(existing) = index.records.get(&record.id) {
            return Ok((existing.clone(), false));
        }

        let id = record.id.clone();
        for character in [&record.character_a, &record.character_b] {
            index
                .by_character
                .entry(character.clone())
                .or_default()
                .insert(id.clone());
        }

        let handle = Arc::new(Mutex::new(record));
        index.records.insert(id, handle.clone());
        Ok((handle, true))
    }

    async fn list_for(&self, character: &str) -> Result<Vec<RecordHandle>> {
        let index = self.index.read().await;
        Ok(match index.by_character.get(character) {
            Some(ids) => index.handles(ids.iter()),
            None => Vec::new(),
        })
    }

    async fn list_all(&self) -> Result<Vec<RecordHandle>> {
        let index = self.index.read().await;
        let ids: BTreeSet<&String> = index.records.keys().collect();
        Ok(index.handles(ids.into_iter()))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.index.read().await.records.len())
    }
}
