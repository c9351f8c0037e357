// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use bbos_heartbeat::run::{self, HttpSupervisorClient};
use bbos_heartbeat::{Config, DaemonState};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn env_get(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load(env_get);
    let client = HttpSupervisorClient { client: reqwest::Client::new(), base_url: config.supervisor_base_url() };
    let state_path = config.daemon_state_path();
    let mut state = DaemonState::load(&state_path)?;

    tracing::info!("waiting for supervisor to be ready");
    run::wait_until_ready(&client, Duration::from_secs(2)).await;
    tracing::info!("supervisor ready, starting awake/sleep loop");

    let mut first_ever = true;
    let mut legacy_seed = config.legacy_interval_s;

    loop {
        let m = bbos_heartbeat::maturity::maturity(state.total_cycles, config.maturity_cycles, config.growth_curve, config.maturity_jitter);
        let params = bbos_heartbeat::maturity::sample(m, legacy_seed.take());

        tracing::info!(maturity = m, min_awake = params.min_awake, capacity = params.capacity, "starting awake phase");
        let heartbeats = run::run_awake_phase(&client, params, &mut first_ever).await?;
        tracing::info!(heartbeats, "entering sleep phase");

        run::run_sleep_phase(&client, params.replay_ratio).await?;

        state.total_cycles += 1;
        state.save(&state_path)?;
        tracing::info!(total_cycles = state.total_cycles, "cycle complete");
    }
}
