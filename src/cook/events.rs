//! Cook lifecycle events pushed to progress observers
//!
//! Events exist for live status display only. Admission decisions never
//! read them, and delivery is best-effort.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::orchestrator::CookStatus;
use crate::generation::CostAmount;

/// Events emitted over the cook lifecycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CookEvent {
    CookStarted {
        collection_id: String,
        user_id: String,
        attempt_id: Uuid,
        target_supply: u64,
    },
    UnitsAdmitted {
        collection_id: String,
        user_id: String,
        attempt_id: Uuid,
        admitted: u64,
    },
    UnitDispatched {
        collection_id: String,
        user_id: String,
        unit_id: Uuid,
        generation_ref: String,
    },
    UnitCompleted {
        collection_id: String,
        user_id: String,
        generation_ref: String,
        cost: CostAmount,
    },
    CookPaused {
        collection_id: String,
        user_id: String,
        reason: String,
    },
    CookStopped {
        collection_id: String,
        user_id: String,
        reason: String,
    },
    StatusDerived {
        collection_id: String,
        user_id: String,
        status: CookStatus,
    },
}

impl CookEvent {
    /// The collection this event concerns
    pub fn collection_id(&self) -> &str {
        match self {
            CookEvent::CookStarted { collection_id, .. }
            | CookEvent::UnitsAdmitted { collection_id, .. }
            | CookEvent::UnitDispatched { collection_id, .. }
            | CookEvent::UnitCompleted { collection_id, .. }
            | CookEvent::CookPaused { collection_id, .. }
            | CookEvent::CookStopped { collection_id, .. }
            | CookEvent::StatusDerived { collection_id, .. } => collection_id,
        }
    }
}
