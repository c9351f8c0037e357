// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::client::SupervisorClient;
use crate::output::{print_json_or, OutputFormat};
use anyhow::Result;

pub async fn checkpoint(client: &SupervisorClient, format: OutputFormat) -> Result<()> {
    let body = client.post("/criu/checkpoint", serde_json::json!({})).await?;
    print_json_or(format, &body, |v| println!("{}", v.get("status").and_then(|s| s.as_str()).unwrap_or("?")));
    Ok(())
}

pub async fn restore(client: &SupervisorClient, format: OutputFormat) -> Result<()> {
    let body = client.post("/criu/restore", serde_json::json!({})).await?;
    print_json_or(format, &body, |v| println!("{}", v.get("status").and_then(|s| s.as_str()).unwrap_or("?")));
    Ok(())
}

pub async fn status(client: &SupervisorClient, format: OutputFormat) -> Result<()> {
    let body = client.get("/criu/status").await?;
    print_json_or(format, &body, |v| {
        println!(
            "criu: {}, kernel_pid: {}, is_checkpointed: {}",
            v.get("criu").and_then(|c| c.as_str()).unwrap_or("?"),
            v.get("kernel_pid").map(|p| p.to_string()).unwrap_or_else(|| "none".to_string()),
            v.get("is_checkpointed").and_then(|b| b.as_bool()).unwrap_or(false),
        );
    });
    Ok(())
}
