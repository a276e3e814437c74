//! Per-key single-flight registry
//!
//! The first request for an uncached key runs the build; concurrent requests
//! for the same key await that build's result instead of starting their own.
//! If the running request is dropped mid-build, one of the waiters takes over.

use crate::cache::CacheKey;
use crate::error::{BundleError, BundleResult};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::debug;

type BuildSlot = Arc<OnceCell<Result<(), Arc<BundleError>>>>;

/// Registry of builds currently in progress
#[derive(Default)]
pub struct InFlight {
    builds: Mutex<HashMap<CacheKey, BuildSlot>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `build` for `key` unless a build for it is already running
    ///
    /// Failures are returned as [`BundleError::Shared`] to every caller.
    pub async fn run<F, Fut>(&self, key: &CacheKey, build: F) -> BundleResult<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = BundleResult<()>>,
    {
        let guard = SlotGuard {
            inflight: self,
            key,
            slot: self.slot(key),
        };
        let result = guard
            .slot
            .get_or_init(|| async { build().await.map_err(Arc::new) })
            .await
            .clone();
        drop(guard);
        result.map_err(BundleError::Shared)
    }

    /// Number of keys with a registered build
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, BuildSlot>> {
        self.builds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, key: &CacheKey) -> BuildSlot {
        let mut builds = self.lock();
        if let Some(slot) = builds.get(key) {
            debug!("Joining in-flight build for {}", key);
            return slot.clone();
        }
        let slot = BuildSlot::default();
        builds.insert(key.clone(), slot.clone());
        slot
    }

    /// Drop the registry entry once its build finished or nobody else holds it
    fn release(&self, key: &CacheKey, slot: &BuildSlot) {
        let mut builds = self.lock();
        let ours = builds.get(key).is_some_and(|s| Arc::ptr_eq(s, slot));
        // Slots are only cloned under the lock: the map plus this caller is 2
        if ours && (slot.initialized() || Arc::strong_count(slot) == 2) {
            builds.remove(key);
        }
    }
}

/// Releases a caller's slot on completion and on cancellation
struct SlotGuard<'a> {
    inflight: &'a InFlight,
    key: &'a CacheKey,
    slot: BuildSlot,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.inflight.release(self.key, &self.slot);
    }
}
