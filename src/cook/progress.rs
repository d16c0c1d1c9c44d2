//! Progress accessor: produced counts from ground truth
//!
//! Produced counts are derived from completion records on every call, never
//! from in-memory counters. Reads are side-effect free and safe to issue
//! concurrently; the record store is eventually consistent with dispatch,
//! so a unit that just completed may not be visible yet.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CookResult;
use crate::generation::{GenerationRecord, ReviewOutcome};
use crate::store::{GenerationFilter, GenerationStore};

/// Breakdown of produced items for one collection and user
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProducedCount {
    /// Explicitly accepted, plus legacy records with no review outcome
    pub accepted: u64,
    /// Explicitly rejected; excluded from admission sizing
    pub rejected: u64,
    /// Explicitly awaiting review
    pub pending_review: u64,
    /// All countable records (terminal success, non-intermediate)
    pub total: u64,
}

impl ProducedCount {
    /// Fold completion records into a produced count, applying the
    /// counting rules: only terminal successes that are not intermediate
    /// spell steps participate
    pub fn from_records(records: &[GenerationRecord]) -> Self {
        let mut count = Self::default();
        for record in records.iter().filter(|r| r.counts_toward_supply()) {
            count.total += 1;
            match record.review {
                Some(ReviewOutcome::Rejected) => count.rejected += 1,
                Some(ReviewOutcome::Pending) => count.pending_review += 1,
                Some(ReviewOutcome::Accepted) | None => count.accepted += 1,
            }
        }
        count
    }

    /// Effective produced count used for admission decisions: everything
    /// not rejected. Units merely awaiting review still occupy supply, or
    /// admission would overshoot the target while reviews are open.
    pub fn effective(&self) -> u64 {
        self.accepted + self.pending_review
    }
}

/// Read-only accessor over the completion-record store
#[derive(Clone)]
pub struct ProgressAccessor {
    generations: Arc<dyn GenerationStore>,
}

impl ProgressAccessor {
    pub fn new(generations: Arc<dyn GenerationStore>) -> Self {
        Self { generations }
    }

    /// How many accepted/rejected/pending items already exist for this
    /// collection and user, matching either stored owner representation
    pub async fn produced_count(
        &self,
        collection_id: &str,
        user_id: &str,
    ) -> CookResult<ProducedCount> {
        let filter = GenerationFilter::new(collection_id, user_id);
        let records = self.generations.list_generations(&filter).await?;
        Ok(ProducedCount::from_records(&records))
    }
}
