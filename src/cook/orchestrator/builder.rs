//! Builder for the default cook orchestrator

use std::sync::Arc;

use super::core::DefaultCookOrchestrator;
use crate::config::OrchestratorConfig;
use crate::cook::dispatch::GenerationDispatcher;
use crate::cook::ledger::CookLedger;
use crate::cook::notifier::{NullNotifier, ProgressNotifier};
use crate::cook::unit::{UnitResolver, WeightedRandomResolver};
use crate::store::{AttemptStore, CollectionStore, GenerationStore};

/// Builder wiring the orchestrator's collaborators.
///
/// Stores and the dispatcher are required; the resolver defaults to
/// weighted random sampling, the notifier to a no-op, and the
/// configuration to its serde defaults.
pub struct OrchestratorBuilder {
    collections: Arc<dyn CollectionStore>,
    generations: Arc<dyn GenerationStore>,
    attempts: Arc<dyn AttemptStore>,
    dispatcher: Arc<dyn GenerationDispatcher>,
    resolver: Arc<dyn UnitResolver>,
    notifier: Arc<dyn ProgressNotifier>,
    config: OrchestratorConfig,
}

impl OrchestratorBuilder {
    pub fn new(
        collections: Arc<dyn CollectionStore>,
        generations: Arc<dyn GenerationStore>,
        attempts: Arc<dyn AttemptStore>,
        dispatcher: Arc<dyn GenerationDispatcher>,
    ) -> Self {
        Self {
            collections,
            generations,
            attempts,
            dispatcher,
            resolver: Arc::new(WeightedRandomResolver::new()),
            notifier: Arc::new(NullNotifier),
            config: OrchestratorConfig::default(),
        }
    }

    /// Substitute the trait-combination selection policy
    pub fn with_resolver(mut self, resolver: Arc<dyn UnitResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Attach a progress notifier
    pub fn with_notifier(mut self, notifier: Arc<dyn ProgressNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the orchestrator, validating configuration
    pub fn build(self) -> Result<DefaultCookOrchestrator, String> {
        self.config.validate()?;
        let ledger = CookLedger::new(self.attempts);
        Ok(DefaultCookOrchestrator::from_parts(
            self.collections,
            self.generations,
            self.dispatcher,
            self.resolver,
            self.notifier,
            ledger,
            self.config,
        ))
    }
}
