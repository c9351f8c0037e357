// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup configuration, resolved once from the environment the way the
//! teacher daemon's `lifecycle::Config::load()` does (spec §6 env vars).

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn load() -> Self {
        let host = std::env::var("KERNEL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("KERNEL_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        Self { host, port }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
