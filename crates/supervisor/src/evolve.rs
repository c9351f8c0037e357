// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `evolve` endpoint (spec §4.3): fire-and-forget execution of the
//! external rebuild script, guarded so only one run is ever in flight,
//! with status posted into a runs directory for later polling via
//! `GET /evolve/status`.

use crate::config::Config;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::process::Command;

pub struct EvolveTracker {
    in_progress: AtomicBool,
    restart_pending: AtomicBool,
    latest_run: parking_lot::Mutex<Option<String>>,
    latest_status: parking_lot::Mutex<Option<String>>,
    runs_dir: PathBuf,
}

impl EvolveTracker {
    pub fn new(runs_dir: PathBuf) -> Self {
        Self {
            in_progress: AtomicBool::new(false),
            restart_pending: AtomicBool::new(false),
            latest_run: parking_lot::Mutex::new(None),
            latest_status: parking_lot::Mutex::new(None),
            runs_dir,
        }
    }

    pub fn status(&self) -> EvolveStatus {
        EvolveStatus {
            evolve_in_progress: self.in_progress.load(Ordering::SeqCst),
            restart_pending: self.restart_pending.load(Ordering::SeqCst),
            latest_run: self.latest_run.lock().clone(),
            latest_status: self.latest_status.lock().clone(),
        }
    }

    /// Starts the rebuild script in the background and returns immediately.
    /// Returns `false` (without starting anything) if a run is already in
    /// flight — the concurrency guard from spec §4.3/§5.
    pub fn trigger(self: &Arc<Self>, cfg: &Config) -> bool {
        if self.in_progress.swap(true, Ordering::SeqCst) {
            return false;
        }

        let run_name = bbos_core::id::short_id("run");
        let run_dir = self.runs_dir.join(&run_name);
        let script = cfg.evolve_script.clone();
        let tracker = self.clone();
        *self.latest_run.lock() = Some(run_name.clone());
        *self.latest_status.lock() = Some("running".to_string());

        tokio::spawn(async move {
            let _ = tokio::fs::create_dir_all(&run_dir).await;
            let status_path = run_dir.join("status");

            let outcome = Command::new(&script).output().await;
            let status_text = match outcome {
                Ok(output) if output.status.success() => "succeeded",
                Ok(_) => "failed",
                Err(_) => "failed",
            };

            let _ = tokio::fs::write(&status_path, status_text).await;
            *tracker.latest_status.lock() = Some(status_text.to_string());
            tracker.restart_pending.store(status_text == "succeeded", Ordering::SeqCst);
            tracker.in_progress.store(false, Ordering::SeqCst);
        });

        true
    }
}

#[derive(Debug, serde::Serialize)]
pub struct EvolveStatus {
    pub evolve_in_progress: bool,
    pub restart_pending: bool,
    pub latest_run: Option<String>,
    pub latest_status: Option<String>,
}
