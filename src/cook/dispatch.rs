//! Generation dispatch boundary
//!
//! Dispatch is fire-and-forget: submitting a unit returns a handle, never
//! the generated artifact. Completion is observed out-of-band through new
//! completion records in the store. Only submission itself can fail
//! synchronously (unknown generator, permission); failures during
//! generation surface as completion records with failed status.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::unit::TraitSelection;
use crate::collection::{GeneratorRef, ParamOverrides};
use crate::error::CookResult;
use crate::owner::OwnerRef;

/// One unit of work: a resolved trait/parameter combination bound to a
/// generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSpec {
    pub unit_id: Uuid,
    pub collection_id: String,
    pub owner: OwnerRef,
    pub attempt_id: Uuid,
    pub generator: GeneratorRef,
    pub traits: Vec<TraitSelection>,
    #[serde(default)]
    pub params: ParamOverrides,
}

/// Handle for a dispatched-but-not-yet-completed unit.
///
/// `generation_ref` is the id the external pipeline will write the unit's
/// completion record under; reconciliation matches on it. The handle keeps
/// the attempt it was dispatched under so a completion is credited to that
/// attempt even after a later start has opened a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitHandle {
    pub unit_id: Uuid,
    pub attempt_id: Uuid,
    pub generation_ref: String,
    pub submitted_at: DateTime<Utc>,
}

impl UnitHandle {
    pub fn for_unit(unit: &UnitSpec, generation_ref: impl Into<String>) -> Self {
        Self {
            unit_id: unit.unit_id,
            attempt_id: unit.attempt_id,
            generation_ref: generation_ref.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// Capability boundary to the external generator service.
///
/// Alternate generator backends substitute here; tests use the mock in
/// `testing::mocks`.
#[async_trait]
pub trait GenerationDispatcher: Send + Sync {
    /// Submit one unit for generation. Fails fast on an unknown generator
    /// or a permission error; otherwise the unit's outcome arrives later
    /// as a completion record.
    async fn submit(&self, unit: &UnitSpec) -> CookResult<UnitHandle>;
}
