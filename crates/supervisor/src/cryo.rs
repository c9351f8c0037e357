// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The state-only `cryo` path (spec §4.3 "cryo/store, cryo/reload"):
//! always-available fallback to whole-process checkpoint, serializing just
//! the kernel's namespace bindings rather than the OS process image.
//!
//! Per spec §9's second Open Question, the checkpoint path is threaded
//! through as a structured parameter (a plain file path argument) rather
//! than interpolated into code sent to the kernel — the kernel's own
//! `/cryo/dump` and `/cryo/load` routes do the serialization, so the
//! supervisor never constructs code strings at all.

use crate::error::SupervisorError;
use serde_json::{Map, Value};
use std::path::Path;

pub async fn store(client: &reqwest::Client, kernel_base: &str, snapshot_path: &Path) -> Result<(), SupervisorError> {
    let url = format!("{kernel_base}/cryo/dump");
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| SupervisorError::KernelUnavailable(e.to_string()))?;
    let data: Value = resp.json().await.map_err(|e| SupervisorError::KernelUnavailable(e.to_string()))?;
    let values = data.get("values").cloned().unwrap_or_else(|| Value::Object(Map::new()));
    bbos_core::store::save_json(snapshot_path, &values)?;
    Ok(())
}

pub async fn reload(client: &reqwest::Client, kernel_base: &str, snapshot_path: &Path) -> Result<(), SupervisorError> {
    let values: Map<String, Value> = bbos_core::store::load_json(snapshot_path)?;

    client
        .post(format!("{kernel_base}/reset"))
        .send()
        .await
        .map_err(|e| SupervisorError::KernelUnavailable(e.to_string()))?;

    client
        .post(format!("{kernel_base}/cryo/load"))
        .json(&serde_json::json!({"values": values}))
        .send()
        .await
        .map_err(|e| SupervisorError::KernelUnavailable(e.to_string()))?;

    Ok(())
}
