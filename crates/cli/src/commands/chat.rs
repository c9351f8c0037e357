// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::client::SupervisorClient;
use crate::output::{print_json_or, OutputFormat};
use anyhow::Result;

pub async fn handle(client: &SupervisorClient, message: &str, provider: Option<&str>, format: OutputFormat) -> Result<()> {
    let body = client.post("/chat", serde_json::json!({"message": message, "provider": provider})).await?;
    print_json_or(format, &body, |v| {
        if let Some(response) = v.get("response").and_then(|r| r.as_str()) {
            println!("{response}");
        }
    });
    Ok(())
}

pub async fn history(client: &SupervisorClient, format: OutputFormat) -> Result<()> {
    let body = client.get("/chat/history").await?;
    print_json_or(format, &body, |v| {
        if let Some(messages) = v.get("messages").and_then(|m| m.as_array()) {
            for message in messages {
                let role = message.get("role").and_then(|r| r.as_str()).unwrap_or("?");
                let content = message.get("content").and_then(|c| c.as_str()).unwrap_or("");
                println!("[{role}] {content}");
            }
        }
    });
    Ok(())
}

pub async fn log(client: &SupervisorClient, format: OutputFormat) -> Result<()> {
    let body = client.get("/chat/log").await?;
    print_json_or(format, &body, |v| {
        let count = v.get("count").and_then(|c| c.as_u64()).unwrap_or(0);
        println!("{count} tool-log entries");
    });
    Ok(())
}
