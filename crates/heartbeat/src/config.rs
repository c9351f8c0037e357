// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup configuration (spec §6 env vars), resolved once at boot the way
//! the teacher daemon's `lifecycle::Config::load()` does.

use std::path::PathBuf;

const DEFAULT_MATURITY_CYCLES: f64 = 500.0;
const DEFAULT_GROWTH_CURVE: f64 = 0.5;
const DEFAULT_MATURITY_JITTER: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct Config {
    pub supervisor_host: String,
    pub supervisor_port: u16,
    pub memory_dir: PathBuf,
    pub maturity_cycles: f64,
    pub growth_curve: f64,
    pub maturity_jitter: f64,
    /// Legacy `DAEMON_INTERVAL` seconds, used only to seed the first
    /// `cooldown_s` before any maturity sample has been drawn (SPEC_FULL.md
    /// §4.5 "Legacy interval mode").
    pub legacy_interval_s: Option<f64>,
}

impl Config {
    pub fn load(env_get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            supervisor_host: env_get("SUPERVISOR_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            supervisor_port: env_get("SUPERVISOR_PORT").and_then(|v| v.parse().ok()).unwrap_or(8000),
            memory_dir: env_get("BBOS_MEMORY_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(".memory")),
            maturity_cycles: env_get("MATURITY_CYCLES").and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_MATURITY_CYCLES),
            growth_curve: env_get("GROWTH_CURVE").and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_GROWTH_CURVE),
            maturity_jitter: env_get("MATURITY_JITTER").and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_MATURITY_JITTER),
            legacy_interval_s: env_get("DAEMON_INTERVAL").and_then(|v| v.parse().ok()),
        }
    }

    pub fn supervisor_base_url(&self) -> String {
        format!("http://{}:{}", self.supervisor_host, self.supervisor_port)
    }

    pub fn daemon_state_path(&self) -> PathBuf {
        self.memory_dir.join("daemon_state.json")
    }
}
