//! Cook attempt records
//!
//! One record is created per `start` invocation (a resume is a fresh start),
//! forming an append-only audit trail. Attempts accumulate cost and
//! generation references monotonically until finalized.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::generation::CostAmount;
use crate::owner::OwnerRef;

/// Lifecycle status of a cook attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    /// Created, nothing dispatched yet
    Queued,
    /// At least one unit completion recorded
    Running,
    /// Finalized: target met and reviewed
    Completed,
    /// Finalized: stopped by the caller
    Stopped,
}

impl std::fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttemptStatus::Queued => "queued",
            AttemptStatus::Running => "running",
            AttemptStatus::Completed => "completed",
            AttemptStatus::Stopped => "stopped",
        };
        write!(f, "{}", s)
    }
}

/// Durable record of one cook attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookAttempt {
    pub attempt_id: Uuid,
    pub collection_id: String,
    /// User who started the cook
    pub owner: OwnerRef,
    /// Target supply at the time this attempt started
    pub target_supply: u64,
    /// Total cost of completion records applied to this attempt
    pub accumulated_cost: CostAmount,
    /// Generation references produced under this attempt. A set, not a
    /// list: duplicate delivery of the same reference must not double
    /// count.
    pub generation_refs: BTreeSet<String>,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CookAttempt {
    /// Create a new queued attempt
    pub fn new(collection_id: impl Into<String>, owner: OwnerRef, target_supply: u64) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            collection_id: collection_id.into(),
            owner,
            target_supply,
            accumulated_cost: 0,
            generation_refs: BTreeSet::new(),
            status: AttemptStatus::Queued,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Number of generation references recorded under this attempt
    pub fn produced(&self) -> u64 {
        self.generation_refs.len() as u64
    }

    /// Whether the attempt has reached a terminal status
    pub fn is_finalized(&self) -> bool {
        matches!(self.status, AttemptStatus::Completed | AttemptStatus::Stopped)
    }

    /// Apply one unit's completion record.
    ///
    /// Returns false without mutating anything when the reference was
    /// already recorded or the attempt is finalized. A late completion
    /// record still counts in query-derived produced totals, but never
    /// reopens a finalized attempt.
    pub fn record_unit(&mut self, generation_ref: &str, cost_delta: CostAmount) -> bool {
        if self.is_finalized() {
            return false;
        }
        if !self.generation_refs.insert(generation_ref.to_string()) {
            return false;
        }
        self.accumulated_cost += cost_delta;
        if self.status == AttemptStatus::Queued {
            self.status = AttemptStatus::Running;
        }
        true
    }

    /// Move the attempt to a terminal status. Finalization is one-way: a
    /// second call leaves the first outcome in place.
    pub fn finalize(&mut self, status: AttemptStatus) {
        if self.is_finalized() {
            return;
        }
        self.status = status;
        self.completed_at = Some(Utc::now());
    }
}
