// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared supervisor state: the owned kernel child, the checkpoint flag
//! that gates the proxy (spec §4.3 "Proxy rule"), and the evolve tracker.

use crate::config::Config;
use crate::evolve::EvolveTracker;
use bbos_agent::AgentConfig;
use parking_lot::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::process::Child;

pub struct SupervisorState {
    pub config: Config,
    pub agent_config: AgentConfig,
    pub client: reqwest::Client,
    pub kernel_child: Mutex<Option<Child>>,
    pub kernel_pid: Mutex<Option<u32>>,
    /// Set while the kernel is checkpointed (post-checkpoint, pre-restore);
    /// every proxied path returns 503 while this is true (spec §4.3).
    pub is_checkpointed: AtomicBool,
    pub evolve: Arc<EvolveTracker>,
    /// Serializes checkpoint/restore against each other — they are never
    /// expected to run concurrently with one another (spec §5 "Supervisor").
    pub ops_lock: tokio::sync::Mutex<()>,
}

impl SupervisorState {
    pub fn new(config: Config, agent_config: AgentConfig, runs_dir: std::path::PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            kernel_child: Mutex::new(None),
            kernel_pid: Mutex::new(None),
            is_checkpointed: AtomicBool::new(false),
            evolve: Arc::new(EvolveTracker::new(runs_dir)),
            ops_lock: tokio::sync::Mutex::new(()),
            config,
            agent_config,
        }
    }

    pub fn kernel_base_url(&self) -> String {
        self.config.kernel_base_url()
    }
}
