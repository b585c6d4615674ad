use std::sync::{Arc, RwLock};

/// Bridge configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Version tag stamped into reservation payloads so operators can tell
    /// which bridge build created a reservation.
    pub bridge_version: String,
}

/// Hands out immutable configuration snapshots.
///
/// Handlers take one snapshot at the start of an invocation and pass it down
/// the call chain as an ordinary parameter; nothing reads configuration from
/// global or task-local state. Replacing the configuration affects only
/// invocations that start afterwards.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<Arc<Config>>>,
}

impl ConfigHandle {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// Current snapshot, valid for the duration of one call.
    pub fn snapshot(&self) -> Arc<Config> {
        self.inner.read().unwrap().clone()
    }

    /// Install a new configuration; in-flight calls keep the snapshot they
    /// started with.
    pub fn replace(&self, config: Config) {
        *self.inner.write().unwrap() = Arc::new(config);
    }
}
