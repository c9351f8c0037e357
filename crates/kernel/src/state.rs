// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::namespace::Namespace;
use bbos_resource::ResourceRegistry;
use bbos_shell::ShellContext;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared kernel state: the execution namespace, the persisted shell
/// context, the process-wide exec mutex, and the resource registry (spec
/// §5 "Kernel" concurrency model).
pub struct KernelState {
    pub namespace: Namespace,
    pub shell: Mutex<ShellContext>,
    /// Acquired non-blockingly: a contended `try_lock` means another exec
    /// is in flight, so the caller gets `busy`/429 immediately rather than
    /// queueing (spec §4.1, §5).
    pub exec_lock: Mutex<()>,
    pub exec_count: AtomicU64,
    pub resources: ResourceRegistry,
}

impl KernelState {
    pub fn new() -> Self {
        let state = Self {
            namespace: Namespace::new(),
            shell: Mutex::new(ShellContext::new()),
            exec_lock: Mutex::new(()),
            exec_count: AtomicU64::new(0),
            resources: ResourceRegistry::new(),
        };
        // Boot (and implicitly every restore) marks every registered handle
        // stale so the next acquire reconnects lazily (spec §4.2).
        state.resources.restored_all();
        state
    }

    pub fn exec_count(&self) -> u64 {
        self.exec_count.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.exec_lock.try_lock().is_none()
    }
}

impl Default for KernelState {
    fn default() -> Self {
        Self::new()
    }
}
