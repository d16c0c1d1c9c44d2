//! In-memory store backend
//!
//! Backs the engine in tests and in embedded deployments that bring their
//! own persistence. The external generator pipeline is simulated by
//! inserting completion records directly.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AttemptStore, CollectionStore, GenerationFilter, GenerationStore};
use crate::collection::Collection;
use crate::cook::attempt::CookAttempt;
use crate::error::{CookError, CookResult};
use crate::generation::GenerationRecord;

/// In-memory implementation of all store seams
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    generations: RwLock<Vec<GenerationRecord>>,
    attempts: RwLock<HashMap<Uuid, CookAttempt>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert or replace a collection definition
    pub async fn put_collection(&self, collection: Collection) {
        self.collections
            .write()
            .await
            .insert(collection.id.clone(), collection);
    }

    /// Append a completion record, as the external generator pipeline
    /// would
    pub async fn put_generation(&self, record: GenerationRecord) {
        self.generations.write().await.push(record);
    }

    /// Number of completion records held, across all collections
    pub async fn generation_count(&self) -> usize {
        self.generations.read().await.len()
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn get_collection(&self, collection_id: &str) -> CookResult<Option<Collection>> {
        Ok(self.collections.read().await.get(collection_id).cloned())
    }
}

#[async_trait]
impl GenerationStore for MemoryStore {
    async fn list_generations(
        &self,
        filter: &GenerationFilter,
    ) -> CookResult<Vec<GenerationRecord>> {
        let generations = self.generations.read().await;
        Ok(generations
            .iter()
            .filter(|r| {
                r.collection_id == filter.collection_id && r.owner.matches_user(&filter.user_id)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn insert_attempt(&self, attempt: CookAttempt) -> CookResult<()> {
        self.attempts
            .write()
            .await
            .insert(attempt.attempt_id, attempt);
        Ok(())
    }

    async fn get_attempt(&self, attempt_id: Uuid) -> CookResult<Option<CookAttempt>> {
        Ok(self.attempts.read().await.get(&attempt_id).cloned())
    }

    async fn update_attempt(&self, attempt: CookAttempt) -> CookResult<()> {
        let mut attempts = self.attempts.write().await;
        if !attempts.contains_key(&attempt.attempt_id) {
            return Err(CookError::AttemptNotFound {
                attempt_id: attempt.attempt_id,
            });
        }
        attempts.insert(attempt.attempt_id, attempt);
        Ok(())
    }

    async fn list_attempts(&self, collection_id: &str) -> CookResult<Vec<CookAttempt>> {
        let attempts = self.attempts.read().await;
        let mut matching: Vec<CookAttempt> = attempts
            .values()
            .filter(|a| a.collection_id == collection_id)
            .cloned()
            .collect();
        matching.sort_by_key(|a| a.started_at);
        Ok(matching)
    }
}
