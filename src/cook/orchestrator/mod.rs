//! Cook orchestrator module
//!
//! Admission control, run-state lifecycle, and reconciliation against the
//! completion-record store.

pub mod builder;
mod core;
mod pure;

#[cfg(test)]
mod core_tests;

pub use builder::OrchestratorBuilder;
pub use core::{
    CookOrchestrator, CookStatusSnapshot, DefaultCookOrchestrator, StartCook, StartOutcome,
};
pub use pure::{compute_remaining, derive_status, CookStatus, DeriveInputs};
