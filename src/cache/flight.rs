//! Per-key coalescing of backend fetches.
//!
//! The first caller to miss on a key spawns the fetch as its own Tokio task
//! and registers a shared handle; every caller that misses on the same key
//! while the fetch is running awaits that handle instead of issuing another
//! backend call. Because the fetch lives in a detached task, a caller that
//! gives up (its future is dropped) never cancels the fetch for the others.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use metrics::counter;
use tracing::{debug, error};

use crate::application::store::StoreError;

use super::metric_names::METRIC_COALESCED_TOTAL;

type Flight<V> = Shared<BoxFuture<'static, Result<V, StoreError>>>;

/// Registry of fetches currently in flight, keyed by cache key.
pub struct SingleFlight<K, V> {
    name: &'static str,
    in_flight: Arc<DashMap<K, Flight<V>>>,
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Join the fetch registered for `key`, or start one.
    ///
    /// `probe` runs under the registry entry lock before a new fetch starts,
    /// so a value stored by a fetch that finished a moment ago is returned
    /// instead of refetched. `fetch` must store its own successful result in
    /// the cache before resolving: the registration is cleared right after.
    pub async fn run<P, F, Fut>(&self, key: K, probe: P, fetch: F) -> Result<V, StoreError>
    where
        P: FnOnce() -> Option<V>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, StoreError>> + Send + 'static,
    {
        let flight = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(occupied) => {
                counter!(METRIC_COALESCED_TOTAL, "cache" => self.name).increment(1);
                debug!(
                    target = "postcache::cache::flight",
                    cache = self.name,
                    "joining in-flight fetch"
                );
                occupied.get().clone()
            }
            Entry::Vacant(vacant) => {
                if let Some(value) = probe() {
                    return Ok(value);
                }
                let flight = self.spawn(key, fetch());
                vacant.insert(flight.clone());
                flight
            }
        };

        flight.await
    }

    fn spawn<Fut>(&self, key: K, fetch: Fut) -> Flight<V>
    where
        Fut: Future<Output = Result<V, StoreError>> + Send + 'static,
    {
        let guard = FlightGuard {
            key,
            in_flight: Arc::clone(&self.in_flight),
        };
        let name = self.name;
        let handle = tokio::spawn(async move {
            let result = fetch.await;
            drop(guard);
            result
        });

        async move {
            handle.await.unwrap_or_else(|err| {
                error!(
                    target = "postcache::cache::flight",
                    cache = name,
                    error = %err,
                    "fetch task did not complete"
                );
                Err(StoreError::backend(format!("fetch task failed: {err}")))
            })
        }
        .boxed()
        .shared()
    }

    /// Number of fetches currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// Clears the in-flight registration when the fetch task ends, even by panic.
struct FlightGuard<K, V>
where
    K: Eq + Hash,
{
    key: K,
    in_flight: Arc<DashMap<K, Flight<V>>>,
}

impl<K, V> Drop for FlightGuard<K, V>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}
