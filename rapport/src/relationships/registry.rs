//! Relationship registry: create, look up, patch and list relationship records.

use super::store::{InMemoryRelationshipStore, RecordHandle, RelationshipStore};
use super::types::{RelationshipKey, RelationshipPatch, RelationshipRecord, RelationshipType};
use crate::config::{DuplicatePolicy, RelationshipConfig};
use crate::{RapportError, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Keyed registry of relationship records.
///
/// Cloning is cheap; clones share the same backing store.
#[derive(Debug, Clone)]
pub struct RelationshipRegistry {
    store: Arc<dyn RelationshipStore>,
    config: Arc<RelationshipConfig>,
}

impl RelationshipRegistry {
    /// Registry over a fresh in-memory store
    pub fn new(config: RelationshipConfig) -> Self {
        Self::with_store(Arc::new(InMemoryRelationshipStore::new()), config)
    }

    /// Registry over a caller-supplied store
    pub fn with_store(store: Arc<dyn RelationshipStore>, config: RelationshipConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &RelationshipConfig {
        &self.config
    }

    /// Create the relationship between `a` and `b`.
    ///
    /// An existing pair is handled according to `relationships.duplicate_policy`.
    pub async fn create(
        &self,
        a: &str,
        b: &str,
        relationship_type: RelationshipType,
    ) -> Result<RelationshipRecord> {
        validate_pair(a, b)?;

        let record = RelationshipRecord::new(a, b, relationship_type);
        let id = record.id.clone();
        let (handle, inserted) = self.store.insert_if_absent(record).await?;

        if !inserted {
            return match self.config.duplicate_policy {
                DuplicatePolicy::ReturnExisting => {
                    debug!("Relationship {} already exists, returning stored record", id);
                    Ok(handle.lock().await.clone())
                }
                DuplicatePolicy::Reject => Err(RapportError::AlreadyExists { id }),
            };
        }

        let record = handle.lock().await.clone();
        info!(
            "Created {} relationship {} ({})",
            record.relationship_type,
            record.key(),
            record.id
        );
        Ok(record)
    }

    /// Look up the relationship between two characters in either order
    pub async fn get(&self, a: &str, b: &str) -> Result<Option<RelationshipRecord>> {
        match self.store.get_pair(&RelationshipKey::new(a, b)).await? {
            Some(handle) => Ok(Some(handle.lock().await.clone())),
            None => Ok(None),
        }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<RelationshipRecord>> {
        match self.store.get(id).await? {
            Some(handle) => Ok(Some(handle.lock().await.clone())),
            None => Ok(None),
        }
    }

    /// Merge `patch` into the record, clamping metrics and re-deriving the status
    pub async fn update(&self, id: &str, patch: RelationshipPatch) -> Result<RelationshipRecord> {
        let record = self
            .with_record(id, |record| {
                patch.apply_to(record);
                record.clone()
            })
            .await?;

        debug!("Updated relationship {} (status: {})", id, record.current_status);
        Ok(record)
    }

    /// Every relationship involving `character`, ordered by id
    pub async fn list_for(&self, character: &str) -> Result<Vec<RelationshipRecord>> {
        snapshot(self.store.list_for(character).await?).await
    }

    /// Every relationship, ordered by id
    pub async fn list_all(&self) -> Result<Vec<RelationshipRecord>> {
        snapshot(self.store.list_all().await?).await
    }

    /// Run `f` against the record while holding its lock
    pub(crate) async fn with_record<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut RelationshipRecord) -> T,
    ) -> Result<T> {
        let handle = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| RapportError::relationship_not_found(id))?;

        let mut record = handle.lock().await;
        let result = f(&mut record);
        record.clamp_metrics();
        Ok(result)
    }

    /// Pair-addressed variant of [`Self::with_record`]
    pub(crate) async fn with_pair<T>(
        &self,
        a: &str,
        b: &str,
        f: impl FnOnce(&mut RelationshipRecord) -> T,
    ) -> Result<T> {
        let key = RelationshipKey::new(a, b);
        self.with_record(&key.record_id(), f)
            .await
            .map_err(|err| match err {
                RapportError::NotFound { .. } => RapportError::relationship_not_found(key.to_string()),
                other => other,
            })
    }
}

fn validate_pair(a: &str, b: &str) -> Result<()> {
    if a.trim().is_empty() || b.trim().is_empty() {
        return Err(RapportError::Validation(
            "character ids must not be empty".to_string(),
        ));
    }
    if a == b {
        return Err(RapportError::Validation(format!(
            "a character cannot have a relationship with itself: {}",
            a
        )));
    }
    Ok(())
}

async fn snapshot(handles: Vec<RecordHandle>) -> Result<Vec<RelationshipRecord>> {
    let mut records = Vec::with_capacity(handles.len());
    for handle in handles {
        records.push(handle.lock().await.clone());
    }
    records.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationships::RelationshipStatus;

    fn registry() -> RelationshipRegistry {
        RelationshipRegistry::new(RelationshipConfig::default())
    }

    #[tokio::test]
    async fn test_create_and_get_symmetric() {
        let registry = registry();
        let created = registry
            .create("Alice", "Bob", RelationshipType::Friend)
            .await
            .unwrap();

        let ab = registry.get("Alice", "Bob").await.unwrap().unwrap();
        let ba = registry.get("Bob", "Alice").await.unwrap().unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.id, created.id);
        assert_eq!(
            registry.get_by_id(&created.id).await.unwrap().unwrap().id,
            created.id
        );
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_pairs() {
        let registry = registry();
        assert!(matches!(
            registry.create("Alice", "Alice", RelationshipType::Friend).await,
            Err(RapportError::Validation(_))
        ));
        assert!(matches!(
            registry.create("", "Bob", RelationshipType::Friend).await,
            Err(RapportError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_policy() {
        let registry = registry();
        let first = registry
            .create("Alice", "Bob", RelationshipType::Friend)
            .await
            .unwrap();
        let again = registry
            .create("Bob", "Alice", RelationshipType::Enemy)
            .await
            .unwrap();
        assert_eq!(again, first);

        let strict = RelationshipRegistry::new(RelationshipConfig {
            duplicate_policy: DuplicatePolicy::Reject,
            ..Default::default()
        });
        strict
            .create("Alice", "Bob", RelationshipType::Friend)
            .await
            .unwrap();
        assert!(matches!(
            strict.create("Alice", "Bob", RelationshipType::Friend).await,
            Err(RapportError::AlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_merges_and_rederives_status() {
        let registry = registry();
        let record = registry
            .create("Alice", "Bob", RelationshipType::Romantic)
            .await
            .unwrap();

        let updated = registry
            .update(
                &record.id,
                RelationshipPatch {
                    strength: Some(0.9),
                    unresolved_issues: Some(vec!["jealousy".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.strength, 0.9);
        assert_eq!(updated.trust, 0.5);
        assert_eq!(updated.unresolved_issues, vec!["jealousy".to_string()]);
        assert_eq!(updated.current_status, RelationshipStatus::Growing);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let result = registry()
            .update("missing", RelationshipPatch::default())
            .await;
        assert!(matches!(result, Err(RapportError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_for_either_position() {
        let registry = registry();
        registry
            .create("Alice", "Bob", RelationshipType::Friend)
            .await
            .unwrap();
        registry
            .create("Carol", "Alice", RelationshipType::Rival)
            .await
            .unwrap();
        registry
            .create("Bob", "Carol", RelationshipType::Family)
            .await
            .unwrap();

        let alice = registry.list_for("Alice").await.unwrap();
        assert_eq!(alice.len(), 2);
        assert!(alice.iter().all(|r| r.involves("Alice")));
        assert!(alice.windows(2).all(|w| w[0].id <= w[1].id));
        assert_eq!(registry.list_all().await.unwrap().len(), 3);
    }
}
