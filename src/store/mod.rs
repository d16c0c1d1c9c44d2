//! Document-store seams consumed by the cook engine
//!
//! The engine needs keyed lookups and filtered listings; the store's own
//! query layer, indexing, and consistency model live elsewhere. Completion
//! records are eventually consistent with dispatch: a just-submitted unit's
//! record may not be visible yet.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::collection::Collection;
use crate::cook::attempt::CookAttempt;
use crate::error::CookResult;
use crate::generation::GenerationRecord;

/// Filter for generation-record listings.
///
/// Owner matching is by user id so both stored owner representations match.
#[derive(Debug, Clone)]
pub struct GenerationFilter {
    pub collection_id: String,
    pub user_id: String,
}

impl GenerationFilter {
    pub fn new(collection_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// Read access to collection definitions
#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn get_collection(&self, collection_id: &str) -> CookResult<Option<Collection>>;
}

/// Read access to externally-written completion records
#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// All completion records matching the filter, any status or delivery
    /// strategy; callers apply their own counting rules
    async fn list_generations(&self, filter: &GenerationFilter)
        -> CookResult<Vec<GenerationRecord>>;
}

/// Durable storage for cook attempt records
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn insert_attempt(&self, attempt: CookAttempt) -> CookResult<()>;

    async fn get_attempt(&self, attempt_id: Uuid) -> CookResult<Option<CookAttempt>>;

    /// Replace the stored attempt; the store is externally synchronized, so
    /// a plain replace is atomic from the engine's point of view
    async fn update_attempt(&self, attempt: CookAttempt) -> CookResult<()>;

    /// Audit trail: every attempt ever started for a collection, oldest
    /// first
    async fn list_attempts(&self, collection_id: &str) -> CookResult<Vec<CookAttempt>>;
}
