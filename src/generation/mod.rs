//! Generation completion records
//!
//! Completion records are written by the external generator pipeline, never
//! by this crate. They are the sole source of truth for "how much has been
//! produced": the orchestrator must not trust its own in-memory counters
//! after a restart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::owner::OwnerRef;

/// Generation cost in credit-cents
pub type CostAmount = u64;

/// Terminal status of a generation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Completed,
    Failed,
}

/// Review outcome assigned by the collection owner after generation.
///
/// Legacy records predate the review system and carry no outcome at all;
/// those are treated as accepted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOutcome {
    Accepted,
    Rejected,
    Pending,
}

/// How the generated artifact was delivered.
///
/// Multi-step spells write one record per step; only the final delivery
/// counts toward supply.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStrategy {
    #[default]
    Final,
    IntermediateStep,
}

/// One unit's durable, externally-written completion record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// External record id; dispatch handles carry this as their
    /// generation reference
    pub id: String,
    pub collection_id: String,
    pub owner: OwnerRef,
    pub status: GenerationStatus,
    /// None for legacy records written before the review system existed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewOutcome>,
    #[serde(default)]
    pub delivery: DeliveryStrategy,
    #[serde(default)]
    pub cost: CostAmount,
    pub created_at: DateTime<Utc>,
}

impl GenerationRecord {
    /// Whether this record participates in produced-count accounting:
    /// terminal success, and not an intermediate sub-step of a spell
    pub fn counts_toward_supply(&self) -> bool {
        self.status == GenerationStatus::Completed
            && self.delivery != DeliveryStrategy::IntermediateStep
    }

    /// Whether this record is terminal for the unit that produced it
    /// (intermediate sub-steps leave the unit in flight)
    pub fn is_terminal(&self) -> bool {
        self.delivery != DeliveryStrategy::IntermediateStep
    }

    /// Explicit accept, or unset review treated as accepted for legacy
    /// records
    pub fn is_accepted(&self) -> bool {
        matches!(self.review, None | Some(ReviewOutcome::Accepted))
    }
}
