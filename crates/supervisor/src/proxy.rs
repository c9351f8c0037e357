// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The catch-all proxy (spec §4.3, §6): every path not claimed by a
//! supervisor-owned route is forwarded verbatim to the kernel's internal
//! port with a 30s timeout (spec §5 "Supervisor" concurrency model).

use crate::state::SupervisorState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

const PROXY_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn proxy(State(state): State<Arc<SupervisorState>>, method: Method, uri: Uri, body: Bytes) -> impl IntoResponse {
    if state.is_checkpointed.load(Ordering::SeqCst) {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "kernel checkpointed", "is_checkpointed": true})),
        )
            .into_response();
    }

    let url = format!("{}{}", state.kernel_base_url(), uri.path_and_query().map(|p| p.as_str()).unwrap_or(""));

    let mut request = state.client.request(method, url);
    if !body.is_empty() {
        request = request.header("content-type", "application/json").body(body);
    }

    match tokio::time::timeout(PROXY_TIMEOUT, request.send()).await {
        Ok(Ok(resp)) => {
            let status = StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            let bytes = resp.bytes().await.unwrap_or_default();
            (status, bytes).into_response()
        }
        Ok(Err(e)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": format!("Kernel unavailable: {e}")})),
        )
            .into_response(),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "Kernel unavailable: request timed out"})),
        )
            .into_response(),
    }
}
