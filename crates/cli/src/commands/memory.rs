// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::client::SupervisorClient;
use crate::output::{print_json_or, OutputFormat};
use anyhow::Result;

pub async fn learnings(client: &SupervisorClient, format: OutputFormat) -> Result<()> {
    let body = client.get("/digest/learnings").await?;
    print_json_or(format, &body, |v| {
        println!("{}", v.get("learnings").and_then(|l| l.as_str()).unwrap_or(""));
    });
    Ok(())
}

pub async fn digest(client: &SupervisorClient, replay_ratio: Option<f64>, format: OutputFormat) -> Result<()> {
    let body = client.post("/digest", serde_json::json!({"replay_ratio": replay_ratio})).await?;
    print_json_or(format, &body, |v| {
        println!(
            "status: {}, chunks_processed: {}, replays: {}",
            v.get("status").and_then(|s| s.as_str()).unwrap_or("?"),
            v.get("chunks_processed").and_then(|c| c.as_u64()).unwrap_or(0),
            v.get("replays").and_then(|r| r.as_u64()).unwrap_or(0),
        );
    });
    Ok(())
}
