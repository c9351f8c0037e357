// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bbos start`: spawns the supervisor (which in turn spawns the kernel)
//! and the heartbeat daemon as children of the CLI process, then waits for
//! either to exit or for Ctrl+C (spec §2 "three-process pipeline").

use anyhow::{Context, Result};
use tokio::process::Command;

pub async fn handle() -> Result<()> {
    let mut supervisor = Command::new("bbos-supervisor")
        .kill_on_drop(true)
        .spawn()
        .context("failed to spawn bbos-supervisor — is it on $PATH?")?;
    tracing::info!(pid = supervisor.id(), "started supervisor");

    let mut heartbeat = Command::new("bbos-heartbeat")
        .kill_on_drop(true)
        .spawn()
        .context("failed to spawn bbos-heartbeat — is it on $PATH?")?;
    tracing::info!(pid = heartbeat.id(), "started heartbeat");

    tokio::select! {
        status = supervisor.wait() => {
            tracing::warn!(?status, "supervisor exited");
        }
        status = heartbeat.wait() => {
            tracing::warn!(?status, "heartbeat exited");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
    }

    let _ = supervisor.start_kill();
    let _ = heartbeat.start_kill();
    Ok(())
}
