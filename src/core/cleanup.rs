// src/core/cleanup.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

type CleanupFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type CleanupFn = Box<dyn FnOnce() -> CleanupFuture + Send>;

struct Entry {
    id: String,
    callback: CleanupFn,
}

/// Ordered cleanup callbacks to run when the program terminates.
///
/// Owned by the top-level command context and shared (cheap clones) with the signal
/// handler, so the same callbacks run on normal completion, on fatal errors and on
/// Ctrl+C. Running the registry drains it: every callback runs at most once.
///
/// Callbacks are keyed by id so a step can withdraw its cleanup once it is no longer
/// needed (for example a temporary tag that became permanent).
#[derive(Clone, Default)]
pub struct CleanupRegistry {
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl std::fmt::Debug for CleanupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

impl CleanupRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers `callback` under `id`. Re-registering an id replaces the callback
    /// but keeps its original position.
    pub fn register<F, Fut>(&self, id: impl Into<String>, callback: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = id.into();
        let callback: CleanupFn = Box::new(move || Box::pin(callback()) as CleanupFuture);
        let mut entries = self.lock();
        match entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => entry.callback = callback,
            None => {
                log::trace!("Registered cleanup '{}'", id);
                entries.push(Entry { id, callback });
            }
        }
    }

    /// Withdraws the cleanup registered under `id`. Returns whether one existed.
    pub fn remove(&self, id: &str) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        before != entries.len()
    }

    /// Registered ids, in execution order.
    pub fn ids(&self) -> Vec<String> {
        self.lock().iter().map(|entry| entry.id.clone()).collect()
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drains the registry and runs every callback in registration order.
    /// Returns how many callbacks ran.
    ///
    /// Entries are taken one at a time, so a drain that is dropped mid-way (a signal
    /// arriving while a fatal error is being handled) leaves the remaining callbacks
    /// registered for the next drain.
    pub async fn run_all(&self) -> usize {
        let mut count = 0;
        while let Some(entry) = self.take_next() {
            log::debug!("Running cleanup '{}'", entry.id);
            (entry.callback)().await;
            count += 1;
        }
        count
    }

    fn take_next(&self) -> Option<Entry> {
        let mut entries = self.lock();
        (!entries.is_empty()).then(|| entries.remove(0))
    }
}
