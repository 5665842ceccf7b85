use std::sync::{Arc, Mutex, MutexGuard};

use crate::catalog::Catalog;
use crate::wheel::{
    ConfigError, InvalidStateError, SpinConfig, SpinEngine, SpinResult, SpinStateSnapshot,
};

/// Spin engine behind a single lock.
///
/// For hosts that tick from a timer thread and read or reconfigure from a UI
/// thread. Each call holds the lock for its whole duration, so a reader never
/// observes half of a tick.
#[derive(Clone)]
pub struct SharedSpinEngine {
    inner: Arc<Mutex<SpinEngine>>,
}

impl SharedSpinEngine {
    pub fn new(engine: SpinEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    // Engine methods write state only after every check passes; a poisoned
    // lock still guards a consistent engine.
    fn lock(&self) -> MutexGuard<'_, SpinEngine> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn configure(&self, catalog: Catalog, config: SpinConfig) -> Result<(), ConfigError> {
        self.lock().configure(catalog, config)
    }

    pub fn stage_catalog(&self, catalog: Catalog) -> Result<(), ConfigError> {
        self.lock().stage_catalog(catalog)
    }

    pub fn start_spin(&self) -> Result<(), InvalidStateError> {
        self.lock().start_spin()
    }

    pub fn tick(&self) -> SpinStateSnapshot {
        self.lock().tick()
    }

    pub fn abort_spin(&self) -> Result<SpinResult, InvalidStateError> {
        self.lock().abort_spin().cloned()
    }

    pub fn acknowledge(&self) -> Option<SpinResult> {
        self.lock().acknowledge()
    }

    pub fn current_snapshot(&self) -> SpinStateSnapshot {
        self.lock().current_snapshot()
    }

    pub fn last_result(&self) -> Option<SpinResult> {
        self.lock().last_result().cloned()
    }

    /// Run `f` with exclusive access, for multi-step reads that must agree.
    pub fn with<T>(&self, f: impl FnOnce(&mut SpinEngine) -> T) -> T {
        f(&mut self.lock())
    }
}
