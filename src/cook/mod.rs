//! Core cook orchestration engine
//!
//! A cook turns a declarative "produce N items for this collection" request
//! into a bounded, resumable, pausable stream of asynchronous generation
//! dispatches. Ground truth for progress lives in externally-written
//! completion records; everything in-memory here is derivable and
//! disposable.

pub mod attempt;
pub mod dispatch;
pub mod events;
pub mod ledger;
pub mod notifier;
pub mod orchestrator;
pub mod progress;
pub mod run_state;
pub mod unit;

pub use attempt::{AttemptStatus, CookAttempt};
pub use dispatch::{GenerationDispatcher, UnitHandle, UnitSpec};
pub use events::CookEvent;
pub use ledger::CookLedger;
pub use notifier::{BroadcastNotifier, NullNotifier, ProgressNotifier};
pub use orchestrator::{
    CookOrchestrator, CookStatus, CookStatusSnapshot, DefaultCookOrchestrator,
    OrchestratorBuilder, StartCook, StartOutcome,
};
pub use progress::{ProducedCount, ProgressAccessor};
pub use run_state::{CookKey, RunState, RunStateTable};
pub use unit::{SequentialResolver, TraitSelection, UnitResolver, WeightedRandomResolver};
