// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use bbos_agent::AgentConfig;
use bbos_supervisor::state::SupervisorState;
use bbos_supervisor::{process, routes, Config};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
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
    let agent_config = AgentConfig::load(env_get);
    let addr = config.addr();
    let runs_dir = agent_config.memory_dir.join("runs");

    let child = process::spawn_kernel(&config)?;
    let kernel_pid = child.id();
    tracing::info!(?kernel_pid, "spawned kernel child");

    let state = Arc::new(SupervisorState::new(config, agent_config, runs_dir));
    *state.kernel_pid.lock() = kernel_pid;
    *state.kernel_child.lock() = Some(child);

    let app = routes::router(state.clone()).layer(CorsLayer::permissive());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "supervisor listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("received ctrl-c, shutting down");
        })
        .await?;

    if let Some(mut child) = state.kernel_child.lock().take() {
        let _ = child.start_kill();
    }

    Ok(())
}
