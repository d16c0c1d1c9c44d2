//! Cook ledger: durable bookkeeping for cook attempts
//!
//! All mutations are monotonic until finalization; completion recording is
//! idempotent on the generation reference so duplicate webhook delivery
//! cannot double count.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::attempt::{AttemptStatus, CookAttempt};
use crate::error::{CookError, CookResult};
use crate::generation::CostAmount;
use crate::owner::OwnerRef;
use crate::store::AttemptStore;

/// Ledger of cook attempts over an [`AttemptStore`]
#[derive(Clone)]
pub struct CookLedger {
    attempts: Arc<dyn AttemptStore>,
}

impl CookLedger {
    pub fn new(attempts: Arc<dyn AttemptStore>) -> Self {
        Self { attempts }
    }

    /// Create a new queued attempt and return its id
    pub async fn create_attempt(
        &self,
        collection_id: &str,
        owner: &OwnerRef,
        target_supply: u64,
    ) -> CookResult<Uuid> {
        let attempt = CookAttempt::new(collection_id, owner.clone(), target_supply);
        let attempt_id = attempt.attempt_id;
        self.attempts.insert_attempt(attempt).await?;
        debug!(%attempt_id, collection_id, target_supply, "created cook attempt");
        Ok(attempt_id)
    }

    /// Fetch an attempt, failing if it does not exist
    pub async fn get(&self, attempt_id: Uuid) -> CookResult<CookAttempt> {
        self.attempts
            .get_attempt(attempt_id)
            .await?
            .ok_or(CookError::AttemptNotFound { attempt_id })
    }

    /// Apply one unit's completion to the attempt.
    ///
    /// Idempotent on `generation_ref`: returns false and leaves cost and
    /// produced count unchanged when the reference was already recorded or
    /// the attempt is finalized.
    pub async fn record_unit_completion(
        &self,
        attempt_id: Uuid,
        generation_ref: &str,
        cost_delta: CostAmount,
    ) -> CookResult<bool> {
        let mut attempt = self.get(attempt_id).await?;
        if !attempt.record_unit(generation_ref, cost_delta) {
            debug!(
                %attempt_id,
                generation_ref, "completion already recorded or attempt finalized"
            );
            return Ok(false);
        }
        self.attempts.update_attempt(attempt).await?;
        Ok(true)
    }

    /// Finalize an attempt. One-way; re-finalizing returns the attempt as
    /// already stored.
    pub async fn finalize(
        &self,
        attempt_id: Uuid,
        status: AttemptStatus,
    ) -> CookResult<CookAttempt> {
        let mut attempt = self.get(attempt_id).await?;
        if attempt.is_finalized() {
            return Ok(attempt);
        }
        attempt.finalize(status);
        self.attempts.update_attempt(attempt.clone()).await?;
        debug!(%attempt_id, %status, "finalized cook attempt");
        Ok(attempt)
    }
}
