// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use bbos_kernel::{routes, Config, KernelState};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

/// Runs the HTTP listener until either a clean shutdown (Ctrl+C) or a
/// restart signal. Returns `true` if the caller should rebind and serve
/// again, `false` on a clean shutdown.
async fn serve_once(state: Arc<KernelState>, addr: &str) -> anyhow::Result<bool> {
    let app = routes::router(state).layer(CorsLayer::permissive());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "kernel listening");

    let mut restart = signal(SignalKind::user_defined1())?;
    let should_rebind = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let should_rebind2 = should_rebind.clone();

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("received ctrl-c, shutting down");
                }
                _ = restart.recv() => {
                    tracing::info!("received SIGUSR1, will rebind");
                    should_rebind2.store(true, std::sync::atomic::Ordering::SeqCst);
                }
            }
        })
        .await?;

    Ok(should_rebind.load(std::sync::atomic::Ordering::SeqCst))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load();
    let addr = config.addr();
    // Shared across rebinds: a restart must not reset exec counters or the
    // namespace, only recover the listening socket (spec §4.1 "Restart
    // signal" — restored listening sockets may be unusable after whole
    // process restore, but in-memory state survives the restore itself).
    let state = Arc::new(KernelState::new());

    loop {
        match serve_once(state.clone(), &addr).await {
            Ok(true) => continue,
            Ok(false) => break,
            Err(e) => {
                tracing::error!(error = %e, "kernel server error");
                return Err(e);
            }
        }
    }

    Ok(())
}
