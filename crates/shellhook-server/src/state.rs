//! Shared application state.
//!
//! Everything here is built once at startup. The registry and lock table
//! are read-only afterwards; the only mutable shared state is the lock
//! objects themselves and the metric counters.

use std::path::Path;
use std::sync::Arc;

use shellhook_core::{CoreError, Registry};

use crate::concurrency::LockTable;
use crate::launcher::Launcher;
use crate::metrics::Metrics;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Scripts and shared defaults.
    pub registry: Arc<Registry>,
    /// One exclusive lock per non-concurrent script.
    pub locks: Arc<LockTable>,
    /// Process-wide counters.
    pub metrics: Arc<Metrics>,
    /// Runs scripts and records execution metrics.
    pub launcher: Arc<Launcher>,
}

impl AppState {
    /// Builds state around an already-validated registry.
    pub fn new(registry: Registry) -> Self {
        let metrics = Arc::new(Metrics::new());
        let launcher = Launcher::new(Arc::clone(&metrics));
        Self::with_launcher(registry, launcher)
    }

    /// Builds state with a caller-supplied launcher; its metrics become the
    /// process-wide counters.
    pub fn with_launcher(registry: Registry, launcher: Launcher) -> Self {
        let locks = LockTable::from_registry(&registry);
        let metrics = Arc::clone(launcher.metrics());
        AppState {
            registry: Arc::new(registry),
            locks: Arc::new(locks),
            metrics,
            launcher: Arc::new(launcher),
        }
    }

    /// Loads the YAML configuration at `path` and builds state from it.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        Registry::from_file(path).map(Self::new)
    }
}
