// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::client::SupervisorClient;
use crate::output::{print_json_or, OutputFormat};
use anyhow::Result;

pub async fn trigger(client: &SupervisorClient, format: OutputFormat) -> Result<()> {
    let body = client.post("/evolve", serde_json::json!({})).await?;
    print_json_or(format, &body, |v| println!("{}", v.get("status").and_then(|s| s.as_str()).unwrap_or("?")));
    Ok(())
}

pub async fn status(client: &SupervisorClient, format: OutputFormat) -> Result<()> {
    let body = client.get("/evolve/status").await?;
    print_json_or(format, &body, |v| {
        println!(
            "in_progress: {}, latest_run: {}, latest_status: {}",
            v.get("evolve_in_progress").and_then(|b| b.as_bool()).unwrap_or(false),
            v.get("latest_run").and_then(|r| r.as_str()).unwrap_or("none"),
            v.get("latest_status").and_then(|s| s.as_str()).unwrap_or("none"),
        );
    });
    Ok(())
}
