// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to spawn kernel child: {0}")]
    KernelSpawn(std::io::Error),

    #[error("kernel unavailable: {0}")]
    KernelUnavailable(String),

    #[error("checkpoint failed: {detail}")]
    CheckpointFailed { detail: String, log_tail: String },

    #[error("restore failed: {detail}")]
    RestoreFailed { detail: String, log_tail: String },

    #[error("evolve already in progress")]
    EvolveInProgress,

    #[error("io error at {path}: {source}")]
    Io { path: std::path::PathBuf, source: std::io::Error },

    #[error(transparent)]
    Core(#[from] bbos_core::CoreError),
}
