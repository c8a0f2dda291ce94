use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use tokio::sync::watch;

use crate::error::CacheError;

type Outcome<T> = Result<T, CacheError>;
type Calls<T> = Mutex<HashMap<String, watch::Receiver<Option<Outcome<T>>>>>;

/// Per-key duplicate-call suppressor.
///
/// The registry lock is only ever held to install, look up, or remove a call
/// record — never across the load itself, so loads for different keys run
/// fully in parallel.
pub struct SingleFlight<T: Clone> {
    calls: Calls<T>,
}

impl<T: Clone + Send + Sync> SingleFlight<T> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `load` for `key`, unless a call for `key` is already in flight,
    /// in which case the in-flight result is awaited and returned instead.
    ///
    /// For any set of overlapping calls with the same key, `load` executes
    /// exactly once and every caller receives a clone of the same outcome.
    pub async fn run<F, Fut>(&self, key: &str, load: F) -> Outcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        let existing = {
            let calls = self.calls.lock().expect("flight registry lock poisoned");
            calls.get(key).cloned()
        };
        if let Some(mut rx) = existing {
            return Self::await_leader(&mut rx, key).await;
        }

        let (publisher, rx) = watch::channel(None);
        {
            let mut calls = self.calls.lock().expect("flight registry lock poisoned");
            calls.insert(key.to_string(), rx);
        }

        // Leader path. The guard removes the call record even if this future
        // is dropped mid-load, so an abandoned call can never wedge the key.
        let _cleanup = RemoveOnDrop {
            calls: &self.calls,
            key,
        };

        let outcome = load().await;
        let _ = publisher.send(Some(outcome.clone()));
        outcome
    }

    async fn await_leader(
        rx: &mut watch::Receiver<Option<Outcome<T>>>,
        key: &str,
    ) -> Outcome<T> {
        match rx.wait_for(Option::is_some).await {
            Ok(published) => published
                .clone()
                .unwrap_or_else(|| Err(CacheError::LoadAbandoned(key.to_string()))),
            // The leader dropped its publisher without producing a result.
            Err(_) => Err(CacheError::LoadAbandoned(key.to_string())),
        }
    }
}

impl<T: Clone + Send + Sync> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

struct RemoveOnDrop<'a, T: Clone> {
    calls: &'a Calls<T>,
    key: &'a str,
}

impl<T: Clone> Drop for RemoveOnDrop<'_, T> {
    fn drop(&mut self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.remove(self.key);
        }
    }
}
