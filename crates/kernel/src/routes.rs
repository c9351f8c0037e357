// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::namespace::ExecOutcome;
use crate::state::KernelState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use bbos_core::{ExecError, ExecRequest, ExecResult, ExecStatus};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

pub fn router(state: Arc<KernelState>) -> Router {
    Router::new()
        .route("/", get(describe))
        .route("/ping", get(ping))
        .route("/status", get(status))
        .route("/exec", post(exec))
        .route("/reset", post(reset))
        .route("/shell", post(shell))
        .route("/shell/cd", post(shell_cd))
        .route("/shell/env", post(shell_env))
        .route("/cryo/dump", get(cryo_dump))
        .route("/cryo/load", post(cryo_load))
        .with_state(state)
}

async fn ping() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn status(State(state): State<Arc<KernelState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "exec_count": state.exec_count(),
        "resources_count": state.resources.count(),
        "busy": state.is_busy(),
    }))
}

async fn describe() -> impl IntoResponse {
    Json(json!({
        "service": "inner-kernel",
        "endpoints": {
            "POST /exec": "Execute code against the persistent namespace",
            "POST /reset": "Clear the namespace",
            "POST /shell": "Run a shell command",
            "POST /shell/cd": "Set shell cwd",
            "POST /shell/env": "Set shell env var",
            "GET /cryo/dump": "Serialize namespace bindings to a closed-schema JSON map",
            "POST /cryo/load": "Restore namespace bindings from a closed-schema JSON map",
            "GET /ping": "Health check",
            "GET /status": "Kernel status",
        }
    }))
}

async fn exec(State(state): State<Arc<KernelState>>, Json(req): Json<ExecRequest>) -> impl IntoResponse {
    let start = Instant::now();

    let _guard = match state.exec_lock.try_lock() {
        Some(guard) => guard,
        None => {
            let result = ExecResult::busy();
            return respond(result);
        }
    };

    let ExecOutcome { stdout, stderr, error } = state.namespace.exec(&req.code);
    state.exec_count.fetch_add(1, Ordering::SeqCst);
    let timing_ms = start.elapsed().as_millis() as u64;

    let result = ExecResult {
        id: req.id,
        status: if error.is_none() { ExecStatus::Completed } else { ExecStatus::Failed },
        stdout,
        stderr,
        error: error.map(|e| ExecError { kind: e.kind, message: e.message, traceback: e.traceback }),
        timing_ms,
    };
    respond(result)
}

fn respond(result: ExecResult) -> (StatusCode, Json<ExecResult>) {
    let status = StatusCode::from_u16(result.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(result))
}

async fn reset(State(state): State<Arc<KernelState>>) -> impl IntoResponse {
    state.namespace.reset();
    state.resources.restored_all();
    Json(json!({"status": "completed"}))
}

#[derive(Debug, Deserialize)]
struct ShellRequest {
    #[serde(default)]
    command: String,
}

#[derive(Debug, Serialize)]
struct ShellResponse {
    status: &'static str,
    stdout: String,
    stderr: String,
    returncode: i32,
}

async fn shell(State(state): State<Arc<KernelState>>, Json(req): Json<ShellRequest>) -> impl IntoResponse {
    if req.command.is_empty() {
        return (
            StatusCode::OK,
            Json(json!({"status": "failed", "error": "Missing 'command'", "stdout": "", "stderr": "", "returncode": -1})),
        );
    }
    let ctx = state.shell.lock().clone();
    let outcome = bbos_shell::run_command(&ctx, &req.command).await;
    (
        StatusCode::OK,
        Json(serde_json::to_value(ShellResponse {
            status: outcome.status,
            stdout: outcome.stdout,
            stderr: outcome.stderr,
            returncode: outcome.returncode,
        })
        .unwrap_or_default()),
    )
}

#[derive(Debug, Deserialize)]
struct ShellCdRequest {
    #[serde(default)]
    path: String,
}

async fn shell_cd(State(state): State<Arc<KernelState>>, Json(req): Json<ShellCdRequest>) -> impl IntoResponse {
    if req.path.is_empty() {
        return (StatusCode::OK, Json(json!({"status": "failed", "error": "Missing 'path'"})));
    }
    state.shell.lock().cd(req.path.clone());
    (StatusCode::OK, Json(json!({"status": "completed", "path": req.path})))
}

#[derive(Debug, Deserialize)]
struct ShellEnvRequest {
    #[serde(default)]
    key: String,
    #[serde(default)]
    value: String,
}

async fn shell_env(State(state): State<Arc<KernelState>>, Json(req): Json<ShellEnvRequest>) -> impl IntoResponse {
    if req.key.is_empty() {
        return (StatusCode::OK, Json(json!({"status": "failed", "error": "Missing 'key'"})));
    }
    state.shell.lock().set_env(req.key.clone(), req.value.clone());
    (StatusCode::OK, Json(json!({"status": "completed", "key": req.key, "value": req.value})))
}

/// State-only serialization for the supervisor's `cryo` fallback (spec
/// §4.3). Returns the closed-schema map of every non-reserved namespace
/// binding that can round-trip through JSON.
async fn cryo_dump(State(state): State<Arc<KernelState>>) -> impl IntoResponse {
    Json(json!({"status": "completed", "values": state.namespace.dump()}))
}

#[derive(Debug, Deserialize)]
struct CryoLoadRequest {
    #[serde(default)]
    values: serde_json::Map<String, serde_json::Value>,
}

async fn cryo_load(State(state): State<Arc<KernelState>>, Json(req): Json<CryoLoadRequest>) -> impl IntoResponse {
    state.namespace.load(&req.values);
    Json(json!({"status": "completed"}))
}
