// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("{provider} request failed: {source}")]
    Request { provider: &'static str, source: reqwest::Error },

    #[error("{provider} returned no usable response")]
    EmptyResponse { provider: &'static str },

    #[error("io error at {path}: {source}")]
    Io { path: std::path::PathBuf, source: std::io::Error },

    #[error("json error at {path}: {source}")]
    Json { path: std::path::PathBuf, source: serde_json::Error },
}

impl From<bbos_core::CoreError> for AgentError {
    fn from(err: bbos_core::CoreError) -> Self {
        match err {
            bbos_core::CoreError::Io { path, source } => AgentError::Io { path, source },
            bbos_core::CoreError::Json { path, source } => AgentError::Json { path, source },
            bbos_core::CoreError::NoHomeDir => {
                AgentError::Io { path: std::path::PathBuf::new(), source: std::io::Error::other("no home dir") }
            }
        }
    }
}
