//! Per-key deduplication of in-flight work

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use stowage_errors::{Error, InstallError};

/// Clonable handle to the outcome of a deduplicated task
pub type SharedResult<T> = Shared<BoxFuture<'static, Result<T, Error>>>;

/// Registry of running tasks keyed by `K`
///
/// The first caller for a key spawns the task; every caller that arrives
/// while it is still registered gets a clone of the same future. The task
/// unregisters itself once it settles, so a later call starts fresh work.
/// Tasks run on the Tokio runtime whether or not anyone polls the handle.
pub struct FetchLocker<K, T>
where
    K: Eq + Hash,
{
    inflight: Arc<DashMap<K, SharedResult<T>>>,
}

impl<K, T> Clone for FetchLocker<K, T>
where
    K: Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            inflight: Arc::clone(&self.inflight),
        }
    }
}

impl<K, T> Default for FetchLocker<K, T>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            inflight: Arc::new(DashMap::new()),
        }
    }
}

impl<K, T> FetchLocker<K, T>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` unless work for `key` is already in flight
    ///
    /// `task` is only invoked when this call registers the key, and must not
    /// call back into the locker before returning its future. Must be called
    /// from within a Tokio runtime.
    pub fn run_exclusive<F, Fut>(&self, key: K, task: F) -> SharedResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        match self.inflight.entry(key.clone()) {
            Entry::Occupied(entry) => {
                tracing::trace!(key = %key, "joining in-flight task");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                // Holding the vacant entry keeps the shard locked, so the
                // task cannot unregister before the insert below lands.
                let guard = Unregister {
                    registry: Arc::clone(&self.inflight),
                    key: key.clone(),
                };
                let work = task();
                let handle = tokio::spawn(async move {
                    let _guard = guard;
                    work.await
                });

                let shared = async move {
                    match handle.await {
                        Ok(result) => result,
                        Err(e) => Err(InstallError::TaskError {
                            package: key.to_string(),
                            message: e.to_string(),
                        }
                        .into()),
                    }
                }
                .boxed()
                .shared();

                entry.insert(shared.clone());
                shared
            }
        }
    }

    #[must_use]
    pub fn is_in_flight(&self, key: &K) -> bool {
        self.inflight.contains_key(key)
    }

    /// Keys with a task still running
    #[must_use]
    pub fn in_flight(&self) -> Vec<K> {
        self.inflight.iter().map(|entry| entry.key().clone()).collect()
    }
}

/// Removes a key from the registry when its task finishes or unwinds
struct Unregister<K, T>
where
    K: Eq + Hash,
{
    registry: Arc<DashMap<K, SharedResult<T>>>,
    key: K,
}

impl<K, T> Drop for Unregister<K, T>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        self.registry.remove(&self.key);
    }
}
