//! Per-key mutual exclusion for concurrent ingestions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of async mutexes keyed by record id.
///
/// Holding the guard for an id serializes the read-diff-write sequence
/// for that id; work on other ids proceeds in parallel. Entries persist
/// for the lifetime of the registry, which is scoped to one pipeline
/// run.
#[derive(Clone, Debug, Default)]
pub struct KeyedLocks {
    inner: Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a key, waiting if another invocation holds it.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().expect("lock registry poisoned");
            Arc::clone(map.entry(key.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}
