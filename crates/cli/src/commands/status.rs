// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::client::SupervisorClient;
use crate::output::{print_json_or, OutputFormat};
use anyhow::Result;

pub async fn handle(client: &SupervisorClient, format: OutputFormat) -> Result<()> {
    let body = client.get("/status").await?;
    print_json_or(format, &body, |v| {
        println!("supervisor: ok");
        println!("is_checkpointed: {}", v.get("is_checkpointed").and_then(|b| b.as_bool()).unwrap_or(false));
        println!("evolve_in_progress: {}", v.get("evolve_in_progress").and_then(|b| b.as_bool()).unwrap_or(false));
    });
    Ok(())
}
