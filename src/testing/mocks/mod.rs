//! Mock implementations for the engine's external boundaries
//!
//! The dispatcher mock stands in for the external generator service; the
//! notifier mocks prove that observer failures never leak into
//! orchestration results.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use crate::cook::dispatch::{GenerationDispatcher, UnitHandle, UnitSpec};
use crate::cook::events::CookEvent;
use crate::cook::notifier::ProgressNotifier;
use crate::error::{CookError, CookResult};
use crate::generation::{CostAmount, DeliveryStrategy, GenerationRecord, GenerationStatus};
use crate::store::MemoryStore;

enum DispatchBehavior {
    Accept,
    UnknownGenerator,
    PermissionDenied,
}

/// Scriptable generator boundary.
///
/// By default submissions are accepted and the unit stays in flight until
/// the test writes its completion record. `completing_into` makes the mock
/// write a completed record immediately, simulating a fast external
/// pipeline.
pub struct MockDispatcher {
    behavior: DispatchBehavior,
    submitted: Mutex<Vec<UnitSpec>>,
    refs: Mutex<Vec<String>>,
    counter: AtomicU64,
    complete_into: Option<Arc<MemoryStore>>,
    completion_cost: CostAmount,
}

impl MockDispatcher {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            behavior: DispatchBehavior::Accept,
            submitted: Mutex::new(Vec::new()),
            refs: Mutex::new(Vec::new()),
            counter: AtomicU64::new(0),
            complete_into: None,
            completion_cost: 1,
        })
    }

    /// Every submission fails fast with `GeneratorNotFound`
    pub fn rejecting_unknown_generator() -> Arc<Self> {
        Arc::new(Self {
            behavior: DispatchBehavior::UnknownGenerator,
            submitted: Mutex::new(Vec::new()),
            refs: Mutex::new(Vec::new()),
            counter: AtomicU64::new(0),
            complete_into: None,
            completion_cost: 1,
        })
    }

    /// Every submission fails fast with `PermissionDenied`
    pub fn rejecting_permission() -> Arc<Self> {
        Arc::new(Self {
            behavior: DispatchBehavior::PermissionDenied,
            submitted: Mutex::new(Vec::new()),
            refs: Mutex::new(Vec::new()),
            counter: AtomicU64::new(0),
            complete_into: None,
            completion_cost: 1,
        })
    }

    /// Accepting dispatcher that immediately writes a completed record
    /// with the given cost into the store
    pub fn completing_into(store: Arc<MemoryStore>, cost: CostAmount) -> Arc<Self> {
        Arc::new(Self {
            behavior: DispatchBehavior::Accept,
            submitted: Mutex::new(Vec::new()),
            refs: Mutex::new(Vec::new()),
            counter: AtomicU64::new(0),
            complete_into: Some(store),
            completion_cost: cost,
        })
    }

    /// Units submitted so far, in submission order
    pub fn submitted_units(&self) -> Vec<UnitSpec> {
        self.submitted.lock().unwrap().clone()
    }

    /// Generation references handed out so far
    pub fn submitted_refs(&self) -> Vec<String> {
        self.refs.lock().unwrap().clone()
    }

    pub fn submission_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationDispatcher for MockDispatcher {
    async fn submit(&self, unit: &UnitSpec) -> CookResult<UnitHandle> {
        match self.behavior {
            DispatchBehavior::UnknownGenerator => Err(CookError::GeneratorNotFound {
                generator_id: unit.generator.id().to_string(),
            }),
            DispatchBehavior::PermissionDenied => Err(CookError::PermissionDenied {
                user_id: unit.owner.user_id().to_string(),
                generator_id: unit.generator.id().to_string(),
                reason: "mock denies all submissions".to_string(),
            }),
            DispatchBehavior::Accept => {
                let n = self.counter.fetch_add(1, Ordering::SeqCst);
                let generation_ref = format!("gen-{:04}", n);
                self.submitted.lock().unwrap().push(unit.clone());
                self.refs.lock().unwrap().push(generation_ref.clone());

                if let Some(store) = &self.complete_into {
                    store
                        .put_generation(GenerationRecord {
                            id: generation_ref.clone(),
                            collection_id: unit.collection_id.clone(),
                            owner: unit.owner.clone(),
                            status: GenerationStatus::Completed,
                            review: None,
                            delivery: DeliveryStrategy::Final,
                            cost: self.completion_cost,
                            created_at: Utc::now(),
                        })
                        .await;
                }
                Ok(UnitHandle::for_unit(unit, generation_ref))
            }
        }
    }
}

/// Notifier that records every event for assertions
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<CookEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<CookEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressNotifier for RecordingNotifier {
    async fn notify(&self, event: &CookEvent) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Notifier that always fails; orchestration must shrug it off
#[derive(Default)]
pub struct FailingNotifier {
    calls: AtomicUsize,
}

impl FailingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProgressNotifier for FailingNotifier {
    async fn notify(&self, _event: &CookEvent) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("notifier offline"))
    }
}
