//! Configuration for the cook orchestration engine

use serde::{Deserialize, Serialize};

/// Configuration for cook orchestration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum number of concurrent generator submissions per
    /// collection/user key. Admission queues on this bound rather than
    /// overshooting it.
    #[serde(default = "default_max_concurrent_dispatch")]
    pub max_concurrent_dispatch: usize,
    /// Whether per-unit lifecycle events (dispatched/completed) are pushed
    /// to the progress notifier in addition to cook-level events
    #[serde(default = "default_notify_unit_events")]
    pub notify_unit_events: bool,
}

fn default_max_concurrent_dispatch() -> usize {
    10
}

fn default_notify_unit_events() -> bool {
    true
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_dispatch: default_max_concurrent_dispatch(),
            notify_unit_events: default_notify_unit_events(),
        }
    }
}

impl OrchestratorConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent_dispatch == 0 {
            return Err("max_concurrent_dispatch must be greater than 0".to_string());
        }
        Ok(())
    }
}
