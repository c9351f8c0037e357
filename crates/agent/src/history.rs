// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat history persistence (spec §3 "Conversation History", §4.4
//! "Persistence"): a single JSON document, rewritten whole at the end of
//! each turn. Grounded in `agent.py::_load_history`/`_save_history`.

use crate::error::AgentError;
use bbos_core::ChatMessage;
use std::path::Path;

pub fn load_history(path: &Path) -> Vec<ChatMessage> {
    bbos_core::store::load_json(path).unwrap_or_default()
}

pub fn save_history(path: &Path, messages: &[ChatMessage]) -> Result<(), AgentError> {
    bbos_core::store::save_json(path, &messages).map_err(AgentError::from)
}
