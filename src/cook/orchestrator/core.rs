//! Cook orchestrator implementation
//!
//! Turns a declarative "produce N items" request into a bounded stream of
//! asynchronous generation dispatches, and reconciles its in-memory notion
//! of progress against the completion records the external pipeline writes.
//!
//! Admission is serialized per collection/user key: the key's admission
//! mutex is held across the remaining-work computation and the dispatch
//! loop, so two concurrent start calls can never jointly overshoot the
//! target. Pause and stop only take the (separate) state mutex and become
//! visible to an in-flight dispatch loop at its next admission check.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::pure::{self, CookStatus, DeriveInputs};
use crate::collection::{Collection, GeneratorRef, ParamOverrides, TraitTemplate};
use crate::config::OrchestratorConfig;
use crate::cook::attempt::AttemptStatus;
use crate::cook::dispatch::{GenerationDispatcher, UnitHandle, UnitSpec};
use crate::cook::events::CookEvent;
use crate::cook::ledger::CookLedger;
use crate::cook::notifier::{notify_best_effort, ProgressNotifier};
use crate::cook::progress::{ProducedCount, ProgressAccessor};
use crate::cook::run_state::{CookKey, KeyEntry, RunStateTable};
use crate::cook::unit::UnitResolver;
use crate::error::{CookError, CookResult};
use crate::generation::GenerationRecord;
use crate::owner::OwnerRef;
use crate::store::{CollectionStore, GenerationFilter, GenerationStore};

/// Declarative request to produce items for a collection
#[derive(Debug, Clone)]
pub struct StartCook {
    pub collection_id: String,
    pub user_id: String,
    pub generator: GeneratorRef,
    pub traits: TraitTemplate,
    pub params: ParamOverrides,
    pub target_supply: u64,
}

impl StartCook {
    /// Build a start request from a stored collection definition
    pub fn from_collection(collection: &Collection) -> Self {
        Self {
            collection_id: collection.id.clone(),
            user_id: collection.owner.user_id().to_string(),
            generator: collection.generator.clone(),
            traits: collection.traits.clone(),
            params: collection.params.clone(),
            target_supply: collection.target_supply,
        }
    }

    pub fn key(&self) -> CookKey {
        CookKey::new(self.collection_id.clone(), self.user_id.clone())
    }
}

/// Result of one start call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartOutcome {
    pub attempt_id: Uuid,
    /// Units admitted by this call; zero when the collection is already at
    /// or above target, which is the normal "nothing to do" outcome
    pub admitted: u64,
}

/// Point-in-time view of one key's cook
#[derive(Debug, Clone, serde::Serialize)]
pub struct CookStatusSnapshot {
    pub status: CookStatus,
    pub produced: ProducedCount,
    pub target_supply: u64,
    pub running_count: u64,
    pub attempt_id: Option<Uuid>,
    pub pause_reason: Option<String>,
    pub stop_reason: Option<String>,
}

/// Trait for orchestrating cook operations
#[async_trait]
pub trait CookOrchestrator: Send + Sync {
    /// Admit and dispatch units up to the target supply, computed from
    /// ground truth. Creates a new attempt; a resume is exactly this call
    /// issued again.
    async fn start(&self, req: StartCook) -> CookResult<StartOutcome>;

    /// Block further admission without affecting in-flight units
    async fn pause(&self, key: &CookKey, reason: &str) -> CookResult<CookStatusSnapshot>;

    /// Terminally stop the current cook; in-flight units still complete
    /// and count toward produced totals
    async fn stop(&self, key: &CookKey, reason: &str) -> CookResult<CookStatusSnapshot>;

    /// Fold newly-landed completion records into run state and the ledger,
    /// then derive status. Never admits work; safe with empty run state.
    async fn reconcile(&self, key: &CookKey) -> CookResult<CookStatusSnapshot>;

    /// Event-driven completion entry: apply a single record that the
    /// external pipeline just wrote, then derive status
    async fn record_completion(&self, record: &GenerationRecord)
        -> CookResult<CookStatusSnapshot>;

    /// Derive status without mutating anything
    async fn status(&self, key: &CookKey) -> CookResult<CookStatusSnapshot>;
}

/// Default implementation over the store, dispatcher, and notifier seams
pub struct DefaultCookOrchestrator {
    collections: Arc<dyn CollectionStore>,
    generations: Arc<dyn GenerationStore>,
    dispatcher: Arc<dyn GenerationDispatcher>,
    resolver: Arc<dyn UnitResolver>,
    notifier: Arc<dyn ProgressNotifier>,
    progress: ProgressAccessor,
    ledger: CookLedger,
    run_states: RunStateTable,
    config: OrchestratorConfig,
}

impl DefaultCookOrchestrator {
    pub(super) fn from_parts(
        collections: Arc<dyn CollectionStore>,
        generations: Arc<dyn GenerationStore>,
        dispatcher: Arc<dyn GenerationDispatcher>,
        resolver: Arc<dyn UnitResolver>,
        notifier: Arc<dyn ProgressNotifier>,
        ledger: CookLedger,
        config: OrchestratorConfig,
    ) -> Self {
        let progress = ProgressAccessor::new(Arc::clone(&generations));
        Self {
            collections,
            generations,
            dispatcher,
            resolver,
            notifier,
            progress,
            ledger,
            run_states: RunStateTable::new(),
            config,
        }
    }

    /// Dispatch up to `remaining` units under the admission lock, bounded
    /// by the configured concurrent-submission limit. Returns the number
    /// actually admitted.
    async fn dispatch_units(
        &self,
        key: &CookKey,
        entry: &Arc<KeyEntry>,
        req: &StartCook,
        owner: &OwnerRef,
        attempt_id: Uuid,
        remaining: u64,
    ) -> CookResult<u64> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_dispatch));
        let mut submissions = FuturesUnordered::new();
        let mut first_error: Option<CookError> = None;

        for _ in 0..remaining {
            {
                let state = entry.state.lock().await;
                if state.admission_blocked() {
                    info!(%key, "admission interrupted by pause or stop");
                    break;
                }
            }

            let traits = match self.resolver.resolve(&req.traits) {
                Ok(traits) => traits,
                Err(err) => {
                    first_error = Some(err);
                    break;
                }
            };
            let unit = UnitSpec {
                unit_id: Uuid::new_v4(),
                collection_id: req.collection_id.clone(),
                owner: owner.clone(),
                attempt_id,
                generator: req.generator.clone(),
                traits,
                params: req.params.clone(),
            };

            let permit = semaphore.clone().acquire_owned().await.unwrap();
            let dispatcher = Arc::clone(&self.dispatcher);
            let entry = Arc::clone(entry);
            submissions.push(tokio::spawn(async move {
                let result = dispatcher.submit(&unit).await;
                if let Ok(handle) = &result {
                    entry.state.lock().await.insert_unit(handle.clone());
                }
                drop(permit);
                result
            }));
        }

        let mut admitted = 0u64;
        while let Some(joined) = submissions.next().await {
            match joined {
                Ok(Ok(handle)) => {
                    admitted += 1;
                    debug!(
                        %key,
                        unit_id = %handle.unit_id,
                        generation_ref = %handle.generation_ref,
                        "unit dispatched"
                    );
                    if self.config.notify_unit_events {
                        notify_best_effort(
                            self.notifier.as_ref(),
                            &CookEvent::UnitDispatched {
                                collection_id: key.collection_id.clone(),
                                user_id: key.user_id.clone(),
                                unit_id: handle.unit_id,
                                generation_ref: handle.generation_ref.clone(),
                            },
                        )
                        .await;
                    }
                }
                Ok(Err(err)) => {
                    warn!(%key, %err, "unit submission failed");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
                Err(err) => {
                    warn!(%key, %err, "dispatch task panicked");
                }
            }
        }

        if admitted == 0 {
            if let Some(err) = first_error {
                return Err(err);
            }
        }
        Ok(admitted)
    }

    /// Apply one landed record to the run state and ledger. Returns true
    /// when the record closed out a unit this process had in flight.
    async fn apply_landed_record(
        &self,
        key: &CookKey,
        record: &GenerationRecord,
    ) -> CookResult<bool> {
        if !record.is_terminal() {
            // Intermediate spell steps leave the unit in flight.
            return Ok(false);
        }
        let Some(entry) = self.run_states.get(key).await else {
            return Ok(false);
        };
        let handle: Option<UnitHandle> = entry.state.lock().await.complete_unit(&record.id);
        let Some(handle) = handle else {
            return Ok(false);
        };

        self.ledger
            .record_unit_completion(handle.attempt_id, &record.id, record.cost)
            .await?;
        if self.config.notify_unit_events {
            notify_best_effort(
                self.notifier.as_ref(),
                &CookEvent::UnitCompleted {
                    collection_id: key.collection_id.clone(),
                    user_id: key.user_id.clone(),
                    generation_ref: record.id.clone(),
                    cost: record.cost,
                },
            )
            .await;
        }
        Ok(true)
    }

    /// Finalize the current attempt as completed once the target is met,
    /// nothing is running, and no reviews are open
    async fn maybe_finalize_completed(
        &self,
        key: &CookKey,
        produced: &ProducedCount,
    ) -> CookResult<()> {
        let Some(entry) = self.run_states.get(key).await else {
            return Ok(());
        };
        let (running, stopped, attempt_id) = {
            let state = entry.state.lock().await;
            (state.running_count(), state.stopped, state.attempt_id)
        };
        let Some(attempt_id) = attempt_id else {
            return Ok(());
        };
        if stopped || running > 0 || produced.pending_review > 0 {
            return Ok(());
        }

        let attempt = self.ledger.get(attempt_id).await?;
        if attempt.is_finalized() || produced.effective() < attempt.target_supply {
            return Ok(());
        }
        self.ledger
            .finalize(attempt_id, AttemptStatus::Completed)
            .await?;
        info!(%key, %attempt_id, "cook attempt completed");
        Ok(())
    }

    async fn require_collection(&self, collection_id: &str) -> CookResult<Collection> {
        self.collections
            .get_collection(collection_id)
            .await?
            .ok_or_else(|| CookError::CollectionNotFound {
                collection_id: collection_id.to_string(),
            })
    }

    /// Build the status snapshot from already-listed completion records
    async fn snapshot_from_records(
        &self,
        key: &CookKey,
        records: &[GenerationRecord],
    ) -> CookResult<CookStatusSnapshot> {
        let collection = self.require_collection(&key.collection_id).await?;
        let produced = ProducedCount::from_records(records);

        let (running_count, paused, stopped, pause_reason, stop_reason, attempt_id) =
            match self.run_states.get(key).await {
                Some(entry) => {
                    let state = entry.state.lock().await;
                    (
                        state.running_count(),
                        state.paused,
                        state.stopped,
                        state.pause_reason.clone(),
                        state.stop_reason.clone(),
                        state.attempt_id,
                    )
                }
                None => (0, false, false, None, None, None),
            };

        let attempt_status = match attempt_id {
            Some(attempt_id) => Some(self.ledger.get(attempt_id).await?.status),
            None => None,
        };

        let status = pure::derive_status(&DeriveInputs {
            target_supply: collection.target_supply,
            produced: produced.effective(),
            running_count,
            paused,
            stopped,
            attempt_status,
        });

        Ok(CookStatusSnapshot {
            status,
            produced,
            target_supply: collection.target_supply,
            running_count,
            attempt_id,
            pause_reason,
            stop_reason,
        })
    }

    async fn snapshot(&self, key: &CookKey) -> CookResult<CookStatusSnapshot> {
        let filter = GenerationFilter::new(key.collection_id.clone(), key.user_id.clone());
        let records = self.generations.list_generations(&filter).await?;
        self.snapshot_from_records(key, &records).await
    }

    async fn notify_status(&self, key: &CookKey, snapshot: &CookStatusSnapshot) {
        notify_best_effort(
            self.notifier.as_ref(),
            &CookEvent::StatusDerived {
                collection_id: key.collection_id.clone(),
                user_id: key.user_id.clone(),
                status: snapshot.status,
            },
        )
        .await;
    }
}

#[async_trait]
impl CookOrchestrator for DefaultCookOrchestrator {
    async fn start(&self, req: StartCook) -> CookResult<StartOutcome> {
        if req.target_supply == 0 {
            return Err(CookError::InvalidTargetSupply {
                supply: 0,
                reason: "a zero-target collection is not active".to_string(),
            });
        }

        let key = req.key();
        let entry = self.run_states.entry(&key).await;
        // Serialize admission per key: held across the remaining-work
        // computation and the whole dispatch loop.
        let _admission = entry.admission.lock().await;

        let owner = OwnerRef::user(req.user_id.clone());
        let attempt_id = self
            .ledger
            .create_attempt(&req.collection_id, &owner, req.target_supply)
            .await?;

        let running_count = {
            let mut state = entry.state.lock().await;
            state.begin_cook(attempt_id);
            state.running_count()
        };

        let produced = self
            .progress
            .produced_count(&req.collection_id, &req.user_id)
            .await?;
        let remaining =
            pure::compute_remaining(req.target_supply, produced.effective(), running_count);

        info!(
            %key,
            %attempt_id,
            target_supply = req.target_supply,
            produced = produced.effective(),
            running = running_count,
            remaining,
            "cook admission computed"
        );
        notify_best_effort(
            self.notifier.as_ref(),
            &CookEvent::CookStarted {
                collection_id: key.collection_id.clone(),
                user_id: key.user_id.clone(),
                attempt_id,
                target_supply: req.target_supply,
            },
        )
        .await;

        let admitted = if remaining == 0 {
            0
        } else {
            match self
                .dispatch_units(&key, &entry, &req, &owner, attempt_id, remaining)
                .await
            {
                Ok(admitted) => admitted,
                Err(err) => {
                    // Nothing went out; close the attempt so the audit
                    // trail carries no open cook for a failed submission.
                    self.ledger
                        .finalize(attempt_id, AttemptStatus::Stopped)
                        .await?;
                    return Err(err);
                }
            }
        };

        notify_best_effort(
            self.notifier.as_ref(),
            &CookEvent::UnitsAdmitted {
                collection_id: key.collection_id.clone(),
                user_id: key.user_id.clone(),
                attempt_id,
                admitted,
            },
        )
        .await;

        Ok(StartOutcome {
            attempt_id,
            admitted,
        })
    }

    async fn pause(&self, key: &CookKey, reason: &str) -> CookResult<CookStatusSnapshot> {
        let entry = self.run_states.entry(key).await;
        entry.state.lock().await.pause(reason);
        info!(%key, reason, "cook paused");

        notify_best_effort(
            self.notifier.as_ref(),
            &CookEvent::CookPaused {
                collection_id: key.collection_id.clone(),
                user_id: key.user_id.clone(),
                reason: reason.to_string(),
            },
        )
        .await;
        self.snapshot(key).await
    }

    async fn stop(&self, key: &CookKey, reason: &str) -> CookResult<CookStatusSnapshot> {
        let entry = self.run_states.entry(key).await;
        let attempt_id = {
            let mut state = entry.state.lock().await;
            state.stop(reason);
            state.attempt_id
        };
        if let Some(attempt_id) = attempt_id {
            self.ledger
                .finalize(attempt_id, AttemptStatus::Stopped)
                .await?;
        }
        info!(%key, reason, "cook stopped");

        notify_best_effort(
            self.notifier.as_ref(),
            &CookEvent::CookStopped {
                collection_id: key.collection_id.clone(),
                user_id: key.user_id.clone(),
                reason: reason.to_string(),
            },
        )
        .await;
        self.snapshot(key).await
    }

    async fn reconcile(&self, key: &CookKey) -> CookResult<CookStatusSnapshot> {
        let filter = GenerationFilter::new(key.collection_id.clone(), key.user_id.clone());
        let records = self.generations.list_generations(&filter).await?;

        let mut landed = 0usize;
        for record in &records {
            if self.apply_landed_record(key, record).await? {
                landed += 1;
            }
        }
        if landed > 0 {
            debug!(%key, landed, "reconciled landed completion records");
        }

        let produced = ProducedCount::from_records(&records);
        self.maybe_finalize_completed(key, &produced).await?;

        let snapshot = self.snapshot_from_records(key, &records).await?;
        self.notify_status(key, &snapshot).await;
        Ok(snapshot)
    }

    async fn record_completion(
        &self,
        record: &GenerationRecord,
    ) -> CookResult<CookStatusSnapshot> {
        let key = CookKey::new(record.collection_id.clone(), record.owner.user_id());
        self.apply_landed_record(&key, record).await?;

        let filter = GenerationFilter::new(key.collection_id.clone(), key.user_id.clone());
        let records = self.generations.list_generations(&filter).await?;
        let produced = ProducedCount::from_records(&records);
        self.maybe_finalize_completed(&key, &produced).await?;

        let snapshot = self.snapshot_from_records(&key, &records).await?;
        self.notify_status(&key, &snapshot).await;
        Ok(snapshot)
    }

    async fn status(&self, key: &CookKey) -> CookResult<CookStatusSnapshot> {
        self.snapshot(key).await
    }
}
