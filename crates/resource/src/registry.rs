// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`ResourceRegistry`] — tracks every [`crate::ResourceHandle`] a process has
//! created so a single "restored" or "invalidate all" signal can reach them
//! all, without callers having to keep their own list (spec §4.2, §4.1 boot
//! sequence).

use crate::handle::{Reconnectable, ResourceHandle};
use parking_lot::Mutex;
use std::sync::Arc;

/// Registry of live [`ResourceHandle`]s, erased to [`Reconnectable`] so
/// handles over unrelated connection types can share one registry.
#[derive(Default)]
pub struct ResourceRegistry {
    handles: Mutex<Vec<Arc<dyn Reconnectable>>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `handle` in an `Arc`, track it, and hand the `Arc` back so the
    /// caller can call `acquire()` on it directly.
    pub fn register<T>(&self, handle: ResourceHandle<T>) -> Arc<ResourceHandle<T>>
    where
        T: Send + 'static,
    {
        let handle = Arc::new(handle);
        self.handles.lock().push(handle.clone());
        handle
    }

    /// Marks every tracked handle stale without tearing any of them down —
    /// the process just restored from a checkpoint and whatever file
    /// descriptors the handles remember are not the ones that exist now, but
    /// there is nothing live to tear down either (spec §4.1 boot sequence,
    /// step "restored_all").
    pub fn restored_all(&self) {
        for handle in self.handles.lock().iter() {
            handle.restored();
        }
    }

    /// Tears down and invalidates every tracked handle (e.g. on a clean
    /// shutdown or a `reset` that should not leak connections).
    pub fn invalidate_all(&self) {
        for handle in self.handles.lock().iter() {
            handle.invalidate();
        }
    }

    pub fn count(&self) -> usize {
        self.handles.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
            backoff_mul: 1.0,
            jitter_fraction: 0.0,
        }
    }

    #[test]
    fn register_tracks_handle_and_reports_count() {
        let registry = ResourceRegistry::new();
        assert_eq!(registry.count(), 0);
        registry.register(ResourceHandle::new(|| Ok::<_, String>(1_u32)));
        registry.register(ResourceHandle::new(|| Ok::<_, String>(2_u32)));
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn restored_all_forces_rebuild_without_teardown() {
        let registry = ResourceRegistry::new();
        let teardown_calls = Arc::new(AtomicU32::new(0));
        let factory_calls = Arc::new(AtomicU32::new(0));
        let teardown_calls2 = teardown_calls.clone();
        let factory_calls2 = factory_calls.clone();

        let handle = registry.register(
            ResourceHandle::new(move || {
                factory_calls2.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(7_u32)
            })
            .teardown(move |_| {
                teardown_calls2.fetch_add(1, Ordering::SeqCst);
            })
            .retry(fast_retry()),
        );

        handle.acquire().expect("acquire 1");
        registry.restored_all();
        handle.acquire().expect("acquire 2");

        assert_eq!(factory_calls.load(Ordering::SeqCst), 2);
        assert_eq!(teardown_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalidate_all_tears_down_every_handle() {
        let registry = ResourceRegistry::new();
        let teardown_calls = Arc::new(AtomicU32::new(0));
        let teardown_calls2 = teardown_calls.clone();

        let handle = registry.register(
            ResourceHandle::new(|| Ok::<_, String>(1_u32))
                .teardown(move |_| {
                    teardown_calls2.fetch_add(1, Ordering::SeqCst);
                })
                .retry(fast_retry()),
        );

        handle.acquire().expect("acquire 1");
        registry.invalidate_all();
        assert_eq!(teardown_calls.load(Ordering::SeqCst), 1);
    }
}
