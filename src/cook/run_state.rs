//! Per-key run state
//!
//! Volatile by design: run state may always be rebuilt as empty without
//! correctness loss, because correctness is derived from the completion
//! record store, not from this table. Entries are guarded per key so
//! unrelated collections never contend.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::dispatch::UnitHandle;

/// Identity of one cook: a collection being produced for a user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CookKey {
    pub collection_id: String,
    pub user_id: String,
}

impl CookKey {
    pub fn new(collection_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            user_id: user_id.into(),
        }
    }
}

impl fmt::Display for CookKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection_id, self.user_id)
    }
}

/// In-memory state of one key's current cook
#[derive(Debug, Default)]
pub struct RunState {
    /// Dispatched-but-not-yet-completed units, keyed by the generation
    /// reference their completion record will carry
    pub running: HashMap<String, UnitHandle>,
    pub paused: bool,
    pub pause_reason: Option<String>,
    pub stopped: bool,
    pub stop_reason: Option<String>,
    /// The attempt admission is currently feeding
    pub attempt_id: Option<Uuid>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn running_count(&self) -> u64 {
        self.running.len() as u64
    }

    /// Whether admission may dispatch new units right now
    pub fn admission_blocked(&self) -> bool {
        self.paused || self.stopped
    }

    /// Reset lifecycle flags for a fresh cook attempt. A start call always
    /// means "go": it resumes a paused key and begins a new cook on a
    /// stopped one.
    pub fn begin_cook(&mut self, attempt_id: Uuid) {
        self.paused = false;
        self.pause_reason = None;
        self.stopped = false;
        self.stop_reason = None;
        self.attempt_id = Some(attempt_id);
    }

    pub fn pause(&mut self, reason: &str) {
        self.paused = true;
        self.pause_reason = Some(reason.to_string());
    }

    pub fn stop(&mut self, reason: &str) {
        self.stopped = true;
        self.stop_reason = Some(reason.to_string());
    }

    pub fn insert_unit(&mut self, handle: UnitHandle) {
        self.running.insert(handle.generation_ref.clone(), handle);
    }

    /// Remove a unit whose completion record has been observed
    pub fn complete_unit(&mut self, generation_ref: &str) -> Option<UnitHandle> {
        self.running.remove(generation_ref)
    }
}

/// Per-key entry: a state mutex for brief flag/handle mutations, and a
/// separate admission mutex held across an entire start call so two
/// concurrent starts can never compute the same remaining work.
///
/// Pause and stop take only the state mutex, so they become visible to an
/// in-flight dispatch loop at its next admission check instead of waiting
/// for the whole batch.
#[derive(Default)]
pub struct KeyEntry {
    pub admission: Mutex<()>,
    pub state: Mutex<RunState>,
}

/// Concurrency-safe table of run states, keyed by collection and user.
///
/// The outer lock is held only for entry lookup or insert; all per-cook
/// work happens under the entry's own locks.
#[derive(Default)]
pub struct RunStateTable {
    entries: RwLock<HashMap<CookKey, Arc<KeyEntry>>>,
}

impl RunStateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the entry for a key
    pub async fn entry(&self, key: &CookKey) -> Arc<KeyEntry> {
        if let Some(entry) = self.entries.read().await.get(key) {
            return Arc::clone(entry);
        }
        let mut entries = self.entries.write().await;
        Arc::clone(entries.entry(key.clone()).or_default())
    }

    /// The entry for a key, if one exists
    pub async fn get(&self, key: &CookKey) -> Option<Arc<KeyEntry>> {
        self.entries.read().await.get(key).map(Arc::clone)
    }

    /// Drop all run state, as a process restart would
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn entry_is_created_once_and_shared() {
        let table = RunStateTable::new();
        let key = CookKey::new("col-1", "user-1");
        let a = table.entry(&key).await;
        let b = table.entry(&key).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(table.len().await, 1);
    }

    #[tokio::test]
    async fn begin_cook_clears_previous_lifecycle_flags() {
        let mut state = RunState::new();
        state.pause("credits exhausted");
        state.stop("user requested");

        let attempt_id = Uuid::new_v4();
        state.begin_cook(attempt_id);
        assert!(!state.paused);
        assert!(!state.stopped);
        assert_eq!(state.pause_reason, None);
        assert_eq!(state.attempt_id, Some(attempt_id));
    }

    fn handle(generation_ref: &str) -> UnitHandle {
        UnitHandle {
            unit_id: Uuid::new_v4(),
            attempt_id: Uuid::new_v4(),
            generation_ref: generation_ref.to_string(),
            submitted_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn completing_a_unit_removes_it_from_the_running_set() {
        let mut state = RunState::new();
        state.insert_unit(handle("gen-1"));
        state.insert_unit(handle("gen-2"));
        assert_eq!(state.running_count(), 2);

        assert!(state.complete_unit("gen-1").is_some());
        assert!(state.complete_unit("gen-1").is_none());
        assert_eq!(state.running_count(), 1);
    }

    #[tokio::test]
    async fn clear_simulates_a_process_restart() {
        let table = RunStateTable::new();
        let key = CookKey::new("col-1", "user-1");
        table.entry(&key).await;
        table.clear().await;
        assert!(table.get(&key).await.is_none());
        assert!(table.is_empty().await);
    }
}
