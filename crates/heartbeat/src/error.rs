// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeartbeatError {
    #[error("supervisor unreachable: {0}")]
    SupervisorUnreachable(String),

    #[error(transparent)]
    Core(#[from] bbos_core::CoreError),
}
