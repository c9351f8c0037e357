// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The supervisor's own HTTP surface (spec §6): checkpoint/restore, cryo,
//! evolve, chat/digest dispatch into `bbos-agent`, and the history/log/
//! learnings readouts. Everything else falls through to [`crate::proxy`].

use crate::cryo;
use crate::process;
use crate::state::SupervisorState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use bbos_agent::{ChatRequest, Provider};
use bbos_core::{ChatMessage, DigestCursors, ToolLogEntry};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

pub fn router(state: Arc<SupervisorState>) -> Router {
    Router::new()
        .route("/", get(describe))
        .route("/ping", get(ping))
        .route("/status", get(status))
        .route("/chat", post(chat))
        .route("/digest", post(digest))
        .route("/chat/history", get(chat_history))
        .route("/chat/log", get(chat_log))
        .route("/digest/learnings", get(digest_learnings))
        .route("/cryo/store", post(cryo_store))
        .route("/cryo/reload", post(cryo_reload))
        .route("/criu/checkpoint", post(criu_checkpoint))
        .route("/criu/restore", post(criu_restore))
        .route("/criu/status", get(criu_status))
        .route("/evolve", post(evolve))
        .route("/evolve/status", get(evolve_status))
        .fallback(crate::proxy::proxy)
        .with_state(state)
}

fn env_get(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

async fn ping() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn status(State(state): State<Arc<SupervisorState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "is_checkpointed": state.is_checkpointed.load(Ordering::SeqCst),
        "evolve_in_progress": state.evolve.status().evolve_in_progress,
    }))
}

async fn describe() -> impl IntoResponse {
    Json(json!({
        "service": "supervisor",
        "endpoints": {
            "POST /chat": "Run one agent-loop turn",
            "POST /digest": "Run a sleep-phase digest pass",
            "POST /criu/checkpoint": "Whole-process checkpoint of the kernel",
            "POST /criu/restore": "Restore the kernel from a checkpoint",
            "POST /cryo/store": "State-only namespace snapshot",
            "POST /cryo/reload": "Restore from a state-only snapshot",
            "POST /evolve": "Trigger the rebuild script",
            "*": "Proxied to the kernel",
        }
    }))
}

#[derive(Debug, Deserialize)]
struct ChatBody {
    message: String,
    provider: Option<String>,
    #[serde(default)]
    reset: bool,
}

async fn chat(State(state): State<Arc<SupervisorState>>, Json(req): Json<ChatBody>) -> impl IntoResponse {
    if req.reset {
        let _ = bbos_core::store::save_json(&state.agent_config.chat_history_path(), &Vec::<ChatMessage>::new());
    }

    let result = bbos_agent::handle_chat(
        &state.client,
        &state.agent_config,
        &state.kernel_base_url(),
        &state.config.tool_base,
        &state.config.tool_servers,
        env_get,
        ChatRequest { message: &req.message, provider: req.provider.as_deref() },
    )
    .await;

    match result {
        Ok(resp) => Json(json!({"response": resp.response, "provider": resp.provider.as_str(), "tool_count": resp.tool_count})).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": e.to_string()}))).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct DigestBody {
    provider: Option<String>,
    replay_ratio: Option<f64>,
}

async fn digest(State(state): State<Arc<SupervisorState>>, Json(req): Json<DigestBody>) -> impl IntoResponse {
    let provider = bbos_agent::resolve_provider(req.provider.as_deref(), env_get);
    let api_key_var = match provider {
        Provider::Anthropic => "ANTHROPIC_API_KEY",
        Provider::OpenAi => "OPENAI_API_KEY",
    };
    let api_key = env_get(api_key_var).unwrap_or_default();
    let model = match provider {
        Provider::Anthropic => state.agent_config.anthropic_model.clone(),
        Provider::OpenAi => state.agent_config.openai_model.clone(),
    };

    let history: Vec<ChatMessage> = bbos_core::store::load_json(&state.agent_config.chat_history_path()).unwrap_or_default();
    let tool_log: Vec<ToolLogEntry> = bbos_core::store::read_jsonl(&state.agent_config.tool_log_path()).unwrap_or_default();
    let cursors: DigestCursors = bbos_core::store::load_json(&state.agent_config.digest_state_path()).unwrap_or_default();
    let learnings = std::fs::read_to_string(state.agent_config.learnings_path()).unwrap_or_default();
    let brain_text = bbos_agent::brain::load_system_prompt(state.agent_config.brain_dir());
    let replay_ratio = req.replay_ratio.unwrap_or(0.15);

    let consolidator =
        bbos_agent::digest::LlmConsolidator { client: state.client.clone(), provider, api_key, model };

    let result = bbos_agent::digest::run_digest(
        &history,
        &tool_log,
        cursors,
        learnings,
        &state.agent_config.learnings_path(),
        &brain_text,
        replay_ratio,
        &consolidator,
    )
    .await;

    match result {
        Ok(outcome) => {
            let _ = bbos_core::store::save_json(&state.agent_config.digest_state_path(), &outcome.cursors);
            if outcome.chunks_processed > 0 {
                let entry = ToolLogEntry::Digest {
                    ts: chrono::Utc::now().timestamp() as u64,
                    chunks_processed: outcome.chunks_processed,
                    replays: outcome.replays,
                    learnings_len: outcome.learnings.len(),
                };
                let _ = bbos_core::store::append_jsonl(&state.agent_config.tool_log_path(), &entry);
            }
            Json(json!({
                "status": outcome.status,
                "chunks_processed": outcome.chunks_processed,
                "replays": outcome.replays,
                "provider": provider.as_str(),
            }))
            .into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": e.to_string()}))).into_response(),
    }
}

async fn chat_history(State(state): State<Arc<SupervisorState>>) -> impl IntoResponse {
    let messages: Vec<ChatMessage> = bbos_core::store::load_json(&state.agent_config.chat_history_path()).unwrap_or_default();
    Json(json!({"messages": messages}))
}

async fn chat_log(State(state): State<Arc<SupervisorState>>) -> impl IntoResponse {
    let entries: Vec<ToolLogEntry> = bbos_core::store::read_jsonl(&state.agent_config.tool_log_path()).unwrap_or_default();
    let count = entries.len();
    Json(json!({"entries": entries, "count": count}))
}

async fn digest_learnings(State(state): State<Arc<SupervisorState>>) -> impl IntoResponse {
    let path = state.agent_config.learnings_path();
    match std::fs::read_to_string(&path) {
        Ok(text) => Json(json!({"learnings": text, "exists": true})),
        Err(_) => Json(json!({"learnings": "", "exists": false})),
    }
}

async fn cryo_store(State(state): State<Arc<SupervisorState>>) -> impl IntoResponse {
    let snapshot_path = state.agent_config.memory_dir.join("cryo_snapshot.json");
    match cryo::store(&state.client, &state.kernel_base_url(), &snapshot_path).await {
        Ok(()) => Json(json!({"status": "completed", "message": "namespace snapshot stored"})).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"status": "failed", "message": e.to_string()}))).into_response(),
    }
}

async fn cryo_reload(State(state): State<Arc<SupervisorState>>) -> impl IntoResponse {
    let snapshot_path = state.agent_config.memory_dir.join("cryo_snapshot.json");
    match cryo::reload(&state.client, &state.kernel_base_url(), &snapshot_path).await {
        Ok(()) => Json(json!({"status": "completed", "message": "namespace restored from snapshot"})).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"status": "failed", "message": e.to_string()}))).into_response(),
    }
}

async fn criu_checkpoint(State(state): State<Arc<SupervisorState>>) -> impl IntoResponse {
    let _guard = state.ops_lock.lock().await;

    let pid = *state.kernel_pid.lock();
    let Some(pid) = pid else {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"status": "failed", "error": "no kernel pid on record"}))).into_response();
    };

    match process::criu_checkpoint(&state.config, pid).await {
        Ok(()) => {
            state.is_checkpointed.store(true, Ordering::SeqCst);
            Json(json!({"status": "completed"})).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"status": "failed", "error": e.to_string()}))).into_response(),
    }
}

/// Restore polls the kernel's internal port for ~5s (spec §4.3); if it never
/// responds, the supervisor kills the zombie, spawns a fresh kernel, and
/// falls back to the state-only `cryo` path, returning success with
/// `state_only_recovery: true`.
async fn criu_restore(State(state): State<Arc<SupervisorState>>) -> impl IntoResponse {
    let _guard = state.ops_lock.lock().await;

    if let Some(old_pid) = state.kernel_pid.lock().take() {
        let _ = process::kill_pid(old_pid);
    }

    let pidfile = state.config.checkpoint_dir.join("kernel.pid");
    let restored_pid = match process::criu_restore(&state.config, &pidfile).await {
        Ok(pid) => pid,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"status": "failed", "error": e.to_string()}))).into_response();
        }
    };

    *state.kernel_pid.lock() = Some(restored_pid);
    let _ = process::send_restart_signal(restored_pid);

    if poll_kernel_ready(&state, Duration::from_secs(5)).await {
        state.is_checkpointed.store(false, Ordering::SeqCst);
        return Json(json!({"status": "completed", "state_only_recovery": false})).into_response();
    }

    let _ = process::kill_pid(restored_pid);
    match process::spawn_kernel(&state.config) {
        Ok(child) => {
            *state.kernel_pid.lock() = child.id();
            *state.kernel_child.lock() = Some(child);
        }
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"status": "failed", "error": e.to_string()}))).into_response();
        }
    }

    let snapshot_path = state.agent_config.memory_dir.join("cryo_snapshot.json");
    let _ = cryo::reload(&state.client, &state.kernel_base_url(), &snapshot_path).await;
    state.is_checkpointed.store(false, Ordering::SeqCst);
    Json(json!({"status": "completed", "state_only_recovery": true})).into_response()
}

async fn poll_kernel_ready(state: &SupervisorState, budget: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + budget;
    while tokio::time::Instant::now() < deadline {
        if state.client.get(format!("{}/ping", state.kernel_base_url())).send().await.is_ok() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    false
}

async fn criu_status(State(state): State<Arc<SupervisorState>>) -> impl IntoResponse {
    Json(json!({
        "criu": state.config.criu_bin,
        "kernel_pid": *state.kernel_pid.lock(),
        "is_checkpointed": state.is_checkpointed.load(Ordering::SeqCst),
        "checkpoint_dir": state.config.checkpoint_dir,
    }))
}

async fn evolve(State(state): State<Arc<SupervisorState>>) -> impl IntoResponse {
    if state.evolve.trigger(&state.config) {
        Json(json!({"status": "started"})).into_response()
    } else {
        (StatusCode::CONFLICT, Json(json!({"error": "evolve already in progress"}))).into_response()
    }
}

async fn evolve_status(State(state): State<Arc<SupervisorState>>) -> impl IntoResponse {
    Json(state.evolve.status())
}
