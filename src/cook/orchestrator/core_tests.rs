//! Tests for cook orchestrator core behavior
//!
//! Concurrency properties and full cook lifecycles are exercised in the
//! integration tests; these cover the per-operation contracts.

use std::sync::Arc;

use super::builder::OrchestratorBuilder;
use super::core::{CookOrchestrator, DefaultCookOrchestrator, StartCook};
use super::pure::CookStatus;
use crate::cook::attempt::AttemptStatus;
use crate::cook::run_state::CookKey;
use crate::error::CookError;
use crate::generation::ReviewOutcome;
use crate::store::{AttemptStore, MemoryStore};
use crate::testing::fixtures::{completed_record, reviewed_record, tool_collection};
use crate::testing::mocks::{FailingNotifier, MockDispatcher, RecordingNotifier};

fn build_orchestrator(
    store: &Arc<MemoryStore>,
    dispatcher: Arc<MockDispatcher>,
) -> DefaultCookOrchestrator {
    OrchestratorBuilder::new(
        store.clone(),
        store.clone(),
        store.clone(),
        dispatcher,
    )
    .build()
    .unwrap()
}

async fn seeded_store(collection_id: &str, user_id: &str, target: u64) -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store
        .put_collection(tool_collection(collection_id, user_id, target))
        .await;
    store
}

fn start_request(store_target: u64) -> StartCook {
    StartCook::from_collection(&tool_collection("col-1", "user-1", store_target))
}

#[tokio::test]
async fn start_rejects_zero_target_supply() {
    let store = seeded_store("col-1", "user-1", 0).await;
    let dispatcher = MockDispatcher::accepting();
    let orchestrator = build_orchestrator(&store, dispatcher);

    let err = orchestrator.start(start_request(0)).await.unwrap_err();
    assert!(matches!(err, CookError::InvalidTargetSupply { .. }));
}

#[tokio::test]
async fn start_admits_the_full_target_on_a_fresh_collection() {
    let store = seeded_store("col-1", "user-1", 5).await;
    let dispatcher = MockDispatcher::accepting();
    let orchestrator = build_orchestrator(&store, dispatcher.clone());

    let outcome = orchestrator.start(start_request(5)).await.unwrap();
    assert_eq!(outcome.admitted, 5);
    assert_eq!(dispatcher.submission_count(), 5);

    let key = CookKey::new("col-1", "user-1");
    let snapshot = orchestrator.status(&key).await.unwrap();
    assert_eq!(snapshot.status, CookStatus::Running);
    assert_eq!(snapshot.running_count, 5);
}

#[tokio::test]
async fn start_admits_only_the_shortfall() {
    let store = seeded_store("col-1", "user-1", 10).await;
    for i in 0..6 {
        store
            .put_generation(completed_record(&format!("gen-pre-{}", i), "col-1", "user-1"))
            .await;
    }
    let dispatcher = MockDispatcher::accepting();
    let orchestrator = build_orchestrator(&store, dispatcher.clone());

    let outcome = orchestrator.start(start_request(10)).await.unwrap();
    assert_eq!(outcome.admitted, 4);
}

#[tokio::test]
async fn start_at_target_is_a_zero_admission_success() {
    let store = seeded_store("col-1", "user-1", 3).await;
    for i in 0..3 {
        store
            .put_generation(completed_record(&format!("gen-pre-{}", i), "col-1", "user-1"))
            .await;
    }
    let dispatcher = MockDispatcher::accepting();
    let orchestrator = build_orchestrator(&store, dispatcher.clone());

    let outcome = orchestrator.start(start_request(3)).await.unwrap();
    assert_eq!(outcome.admitted, 0);
    assert_eq!(dispatcher.submission_count(), 0);
}

#[tokio::test]
async fn unknown_generator_is_a_synchronous_submission_error() {
    let store = seeded_store("col-1", "user-1", 4).await;
    let dispatcher = MockDispatcher::rejecting_unknown_generator();
    let orchestrator = build_orchestrator(&store, dispatcher);

    let err = orchestrator.start(start_request(4)).await.unwrap_err();
    assert!(matches!(err, CookError::GeneratorNotFound { .. }));
    assert!(err.is_submission_error());

    // Nothing was dispatched, so the key is idle.
    let key = CookKey::new("col-1", "user-1");
    let snapshot = orchestrator.status(&key).await.unwrap();
    assert_eq!(snapshot.running_count, 0);
}

#[tokio::test]
async fn permission_errors_surface_to_the_start_caller() {
    let store = seeded_store("col-1", "user-1", 4).await;
    let dispatcher = MockDispatcher::rejecting_permission();
    let orchestrator = build_orchestrator(&store, dispatcher);

    let err = orchestrator.start(start_request(4)).await.unwrap_err();
    assert!(matches!(err, CookError::PermissionDenied { .. }));
}

#[tokio::test]
async fn pause_records_the_reason_in_the_snapshot() {
    let store = seeded_store("col-1", "user-1", 5).await;
    let dispatcher = MockDispatcher::accepting();
    let orchestrator = build_orchestrator(&store, dispatcher);
    orchestrator.start(start_request(5)).await.unwrap();

    let key = CookKey::new("col-1", "user-1");
    let snapshot = orchestrator.pause(&key, "credits exhausted").await.unwrap();
    assert_eq!(snapshot.pause_reason.as_deref(), Some("credits exhausted"));
    // In-flight units keep the key running; pause only blocks admission.
    assert_eq!(snapshot.status, CookStatus::Running);
    assert_eq!(snapshot.running_count, 5);
}

#[tokio::test]
async fn stop_finalizes_the_attempt_as_stopped() {
    let store = seeded_store("col-1", "user-1", 5).await;
    let dispatcher = MockDispatcher::accepting();
    let orchestrator = build_orchestrator(&store, dispatcher);
    let outcome = orchestrator.start(start_request(5)).await.unwrap();

    let key = CookKey::new("col-1", "user-1");
    let snapshot = orchestrator.stop(&key, "user requested").await.unwrap();
    assert_eq!(snapshot.status, CookStatus::Stopped);
    assert_eq!(snapshot.stop_reason.as_deref(), Some("user requested"));

    let attempt = store.get_attempt(outcome.attempt_id).await.unwrap().unwrap();
    assert_eq!(attempt.status, AttemptStatus::Stopped);
}

#[tokio::test]
async fn notifier_failures_never_affect_orchestration() {
    let store = seeded_store("col-1", "user-1", 3).await;
    let dispatcher = MockDispatcher::accepting();
    let notifier = FailingNotifier::new();
    let orchestrator = OrchestratorBuilder::new(
        store.clone(),
        store.clone(),
        store.clone(),
        dispatcher,
    )
    .with_notifier(notifier.clone())
    .build()
    .unwrap();

    let outcome = orchestrator.start(start_request(3)).await.unwrap();
    assert_eq!(outcome.admitted, 3);
    assert!(notifier.call_count() > 0);
}

#[tokio::test]
async fn lifecycle_events_reach_the_notifier() {
    let store = seeded_store("col-1", "user-1", 2).await;
    let dispatcher = MockDispatcher::accepting();
    let notifier = RecordingNotifier::new();
    let orchestrator = OrchestratorBuilder::new(
        store.clone(),
        store.clone(),
        store.clone(),
        dispatcher,
    )
    .with_notifier(notifier.clone())
    .build()
    .unwrap();

    orchestrator.start(start_request(2)).await.unwrap();
    let events = notifier.events();
    let kinds: Vec<&str> = events
        .iter()
        .map(|e| match e {
            crate::cook::events::CookEvent::CookStarted { .. } => "started",
            crate::cook::events::CookEvent::UnitsAdmitted { .. } => "admitted",
            crate::cook::events::CookEvent::UnitDispatched { .. } => "dispatched",
            _ => "other",
        })
        .collect();
    assert!(kinds.contains(&"started"));
    assert!(kinds.contains(&"admitted"));
    assert_eq!(kinds.iter().filter(|k| **k == "dispatched").count(), 2);
}

#[tokio::test]
async fn sequential_resolver_and_dispatch_bound_are_honored() {
    let store = seeded_store("col-1", "user-1", 4).await;
    let dispatcher = MockDispatcher::accepting();
    let config = crate::config::OrchestratorConfig {
        max_concurrent_dispatch: 2,
        ..Default::default()
    };
    let orchestrator = OrchestratorBuilder::new(
        store.clone(),
        store.clone(),
        store.clone(),
        dispatcher.clone(),
    )
    .with_resolver(Arc::new(crate::cook::unit::SequentialResolver::new()))
    .with_config(config)
    .build()
    .unwrap();

    let outcome = orchestrator.start(start_request(4)).await.unwrap();
    assert_eq!(outcome.admitted, 4);

    // The two-by-two template enumerates four distinct combinations.
    let combos: std::collections::HashSet<String> = dispatcher
        .submitted_units()
        .iter()
        .map(|unit| {
            unit.traits
                .iter()
                .map(|t| t.value.clone())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    assert_eq!(combos.len(), 4);
}

#[tokio::test]
async fn status_requires_a_known_collection() {
    let store = MemoryStore::new();
    let dispatcher = MockDispatcher::accepting();
    let orchestrator = build_orchestrator(&store, dispatcher);

    let key = CookKey::new("col-missing", "user-1");
    let err = orchestrator.status(&key).await.unwrap_err();
    assert!(matches!(err, CookError::CollectionNotFound { .. }));
}

#[tokio::test]
async fn zero_target_collections_report_inactive() {
    let store = seeded_store("col-1", "user-1", 0).await;
    let dispatcher = MockDispatcher::accepting();
    let orchestrator = build_orchestrator(&store, dispatcher);

    let key = CookKey::new("col-1", "user-1");
    let snapshot = orchestrator.status(&key).await.unwrap();
    assert_eq!(snapshot.status, CookStatus::Inactive);
}

#[tokio::test]
async fn reconcile_finalizes_a_fully_reviewed_cook() {
    let store = seeded_store("col-1", "user-1", 2).await;
    let dispatcher = MockDispatcher::completing_into(store.clone(), 3);
    let orchestrator = build_orchestrator(&store, dispatcher);

    let outcome = orchestrator.start(start_request(2)).await.unwrap();
    assert_eq!(outcome.admitted, 2);

    let key = CookKey::new("col-1", "user-1");
    let snapshot = orchestrator.reconcile(&key).await.unwrap();
    assert_eq!(snapshot.status, CookStatus::Completed);
    assert_eq!(snapshot.running_count, 0);

    let attempt = store.get_attempt(outcome.attempt_id).await.unwrap().unwrap();
    assert_eq!(attempt.status, AttemptStatus::Completed);
    assert_eq!(attempt.produced(), 2);
    assert_eq!(attempt.accumulated_cost, 6);
}

#[tokio::test]
async fn reconcile_leaves_pending_reviews_awaiting() {
    let store = seeded_store("col-1", "user-1", 2).await;
    store
        .put_generation(reviewed_record("gen-1", "col-1", "user-1", ReviewOutcome::Accepted))
        .await;
    store
        .put_generation(reviewed_record("gen-2", "col-1", "user-1", ReviewOutcome::Pending))
        .await;
    let dispatcher = MockDispatcher::accepting();
    let orchestrator = build_orchestrator(&store, dispatcher);

    let key = CookKey::new("col-1", "user-1");
    let snapshot = orchestrator.reconcile(&key).await.unwrap();
    assert_eq!(snapshot.status, CookStatus::AwaitingReview);
    assert_eq!(snapshot.produced.pending_review, 1);
}
