// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types for the kernel's `/exec` endpoint (spec §4.1).

use serde::{Deserialize, Serialize};

/// Request body for `POST /exec`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: String,
}

/// Terminal or transient status of one exec call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecStatus {
    Completed,
    Failed,
    Busy,
}

/// Error detail surfaced when an exec raises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecError {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub traceback: String,
}

/// Response body for `POST /exec`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: ExecStatus,
    pub stdout: String,
    pub stderr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ExecError>,
    pub timing_ms: u64,
}

impl ExecResult {
    pub fn busy() -> Self {
        Self {
            id: None,
            status: ExecStatus::Busy,
            stdout: String::new(),
            stderr: String::new(),
            error: Some(ExecError {
                kind: "Busy".to_string(),
                message: "Another execution is in progress".to_string(),
                traceback: String::new(),
            }),
            timing_ms: 0,
        }
    }

    /// HTTP status code this result should be reported with (spec §4.1, §7).
    pub fn http_status(&self) -> u16 {
        match self.status {
            ExecStatus::Completed => 200,
            ExecStatus::Failed => 500,
            ExecStatus::Busy => 429,
        }
    }
}
