use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use metrics::counter;
use tracing::warn;

use super::metric_names::METRIC_LOCK_POISONED_TOTAL;

/// Acquire a read guard, recovering the inner state if a writer panicked.
pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    cache: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poisoned| {
        report_poisoned(cache, op, "rwlock.read");
        poisoned.into_inner()
    })
}

/// Acquire a write guard, recovering the inner state if a writer panicked.
///
/// LRU reads also go through here because touching an entry reorders it.
pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    cache: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poisoned| {
        report_poisoned(cache, op, "rwlock.write");
        poisoned.into_inner()
    })
}

fn report_poisoned(cache: &'static str, op: &'static str, lock_kind: &'static str) {
    counter!(METRIC_LOCK_POISONED_TOTAL, "cache" => cache).increment(1);
    warn!(
        target = "postcache::cache::lock",
        cache,
        op,
        lock_kind,
        result = "poisoned_recovered",
        "Recovered from poisoned cache lock; entries written by the panicking thread may be partial"
    );
}
