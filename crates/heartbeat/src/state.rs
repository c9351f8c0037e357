// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon state: the cycle counter that seeds the maturity curve across
//! restarts (spec §3 "Daemon State").

use crate::error::HeartbeatError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DaemonState {
    pub total_cycles: u64,
}

impl DaemonState {
    pub fn load(path: &Path) -> Result<Self, HeartbeatError> {
        Ok(bbos_core::store::load_json(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), HeartbeatError> {
        bbos_core::store::save_json(path, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_starts_at_zero_cycles() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = DaemonState::load(&dir.path().join("missing.json")).expect("load");
        assert_eq!(state.total_cycles, 0);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("daemon_state.json");
        DaemonState { total_cycles: 7 }.save(&path).expect("save");
        let loaded = DaemonState::load(&path).expect("load");
        assert_eq!(loaded.total_cycles, 7);
    }
}
