// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool discovery, grounded in `agent.py::_discover_mcp_tools`
//! (spec §4.4). The original speaks MCP-over-SSE to each tool server; no
//! MCP client crate exists anywhere in this pack, so discovery here speaks
//! a plain HTTP/JSON contract (`GET /servers/<name>/tools`) against the
//! same tool-server fleet instead — a re-architecture in the same spirit as
//! spec §9's license to replace the exec namespace, applied to the one
//! other place the original depends on a library this pack does not carry.
//! The resulting catalog shape (`qualified_name`, sanitized schema,
//! server map) is unchanged.

use crate::schema::sanitize_schema;
use crate::tools::ToolSpec;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Per-server discovery timeout (spec §5: "15s local / 20s remote" collapses
/// to one conservative bound here since the HTTP re-architecture does not
/// distinguish local/remote transports).
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct ToolServerConfig {
    pub name: String,
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
struct RawTool {
    name: String,
    description: Option<String>,
    input_schema: Option<Value>,
}

/// Returns the flat catalog plus a `qualified_name -> server name` map.
/// A single server's failure or timeout is logged and skipped; it is never
/// fatal to discovery as a whole (spec §7 "Tool discovery").
pub async fn discover_tools(client: &reqwest::Client, servers: &[ToolServerConfig]) -> (Vec<ToolSpec>, HashMap<String, String>) {
    let mut all_tools = Vec::new();
    let mut tool_server_map = HashMap::new();

    for server in servers {
        match tokio::time::timeout(DISCOVERY_TIMEOUT, discover_one(client, server)).await {
            Ok(Ok(tools)) => {
                for tool in tools {
                    tool_server_map.insert(tool.name.clone(), server.name.clone());
                    all_tools.push(tool);
                }
            }
            Ok(Err(e)) => tracing::warn!(server = %server.name, error = %e, "could not connect to tool server"),
            Err(_) => tracing::warn!(server = %server.name, "timeout connecting to tool server"),
        }
    }

    (all_tools, tool_server_map)
}

async fn discover_one(client: &reqwest::Client, server: &ToolServerConfig) -> Result<Vec<ToolSpec>, reqwest::Error> {
    let url = format!("{}/servers/{}/tools", server.base_url, server.name);
    let raw: Vec<RawTool> = client.get(url).send().await?.error_for_status()?.json().await?;

    Ok(raw
        .into_iter()
        .map(|tool| {
            let description = tool.description.unwrap_or_else(|| tool.name.clone());
            let schema = tool.input_schema.unwrap_or_else(|| json!({"type": "object", "properties": {}}));
            ToolSpec {
                name: format!("{}__{}", server.name, tool.name),
                description: format!("[{}] {}", server.name, description),
                input_schema: sanitize_schema(&schema),
            }
        })
        .collect())
}
