// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool-call dispatch, grounded in `agent.py::_call_kernel_tool` and
//! `_call_mcp_tool` (spec §4.4 step 4): kernel tools are dispatched to the
//! supervisor's own `/exec`, `/shell`, `/evolve` endpoints; everything else
//! is routed to whichever tool server advertised it. Any failure becomes a
//! textual tool result rather than propagating, so the LLM sees the error
//! and may recover.

use crate::tools::{EXEC_PYTHON, RUN_SHELL, SELF_EVOLVE};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Remote tool calls get a 90s deadline (spec §4.4, §5); discovery elsewhere
/// uses a shorter per-server budget.
const TOOL_CALL_TIMEOUT: Duration = Duration::from_secs(90);

pub struct Dispatcher {
    pub client: reqwest::Client,
    pub kernel_base: String,
    pub tool_base: String,
    pub tool_server_map: HashMap<String, String>,
}

impl Dispatcher {
    pub async fn dispatch(&self, name: &str, arguments: &Value) -> String {
        if is_kernel_tool(name) {
            self.call_kernel_tool(name, arguments).await
        } else if let Some(server) = self.tool_server_map.get(name) {
            let real_name = name.splitn(2, "__").nth(1).unwrap_or(name);
            self.call_remote_tool(server, real_name, arguments).await
        } else {
            format!("Unknown tool: {name}")
        }
    }

    async fn call_kernel_tool(&self, name: &str, arguments: &Value) -> String {
        match name {
            EXEC_PYTHON => {
                let code = arguments.get("code").and_then(Value::as_str).unwrap_or("");
                let url = format!("{}/exec", self.kernel_base);
                match self.client.post(url).json(&json!({"code": code})).send().await {
                    Ok(resp) => match resp.json::<Value>().await {
                        Ok(data) => format_exec_result(&data),
                        Err(e) => format!("Tool error: decode: {e}"),
                    },
                    Err(e) => format!("Tool error: request: {e}"),
                }
            }
            RUN_SHELL => {
                let command = arguments.get("command").and_then(Value::as_str).unwrap_or("");
                let url = format!("{}/shell", self.kernel_base);
                match self.client.post(url).json(&json!({"command": command})).send().await {
                    Ok(resp) => match resp.json::<Value>().await {
                        Ok(data) => format_shell_result(&data),
                        Err(e) => format!("Tool error: decode: {e}"),
                    },
                    Err(e) => format!("Tool error: request: {e}"),
                }
            }
            SELF_EVOLVE => {
                let url = format!("{}/evolve", self.kernel_base);
                match self.client.post(url).send().await {
                    Ok(resp) => match resp.json::<Value>().await {
                        Ok(data) => data
                            .get("message")
                            .and_then(Value::as_str)
                            .unwrap_or("Evolve triggered.")
                            .to_string(),
                        Err(e) => format!("Tool error: decode: {e}"),
                    },
                    Err(e) => format!("Tool error: request: {e}"),
                }
            }
            other => format!("Unknown kernel tool: {other}"),
        }
    }

    async fn call_remote_tool(&self, server: &str, tool: &str, arguments: &Value) -> String {
        let url = format!("{}/servers/{}/tools/{}", self.tool_base, server, tool);
        let call = self.client.post(url).json(arguments).send();
        match tokio::time::timeout(TOOL_CALL_TIMEOUT, call).await {
            Ok(Ok(resp)) => match resp.text().await {
                Ok(text) if !text.is_empty() => text,
                Ok(_) => "(no output)".to_string(),
                Err(e) => format!("Tool error: decode: {e}"),
            },
            Ok(Err(e)) => format!("Tool error: request: {e}"),
            Err(_) => "Tool error: timeout: tool call exceeded 90s deadline".to_string(),
        }
    }
}

fn is_kernel_tool(name: &str) -> bool {
    crate::tools::is_kernel_tool(name)
}

fn format_exec_result(data: &Value) -> String {
    let mut parts = Vec::new();
    if let Some(stdout) = data.get("stdout").and_then(Value::as_str).filter(|s| !s.is_empty()) {
        parts.push(stdout.to_string());
    }
    if let Some(stderr) = data.get("stderr").and_then(Value::as_str).filter(|s| !s.is_empty()) {
        parts.push(format!("STDERR: {stderr}"));
    }
    if let Some(err) = data.get("error").filter(|e| !e.is_null()) {
        let kind = err.get("type").and_then(Value::as_str).unwrap_or("unknown");
        let message = err.get("message").and_then(Value::as_str).unwrap_or("");
        parts.push(format!("ERROR ({kind}): {message}"));
    }
    if parts.is_empty() {
        "(no output)".to_string()
    } else {
        parts.join("\n")
    }
}

fn format_shell_result(data: &Value) -> String {
    let mut parts = Vec::new();
    if let Some(stdout) = data.get("stdout").and_then(Value::as_str).filter(|s| !s.is_empty()) {
        parts.push(stdout.to_string());
    }
    if let Some(stderr) = data.get("stderr").and_then(Value::as_str).filter(|s| !s.is_empty()) {
        parts.push(format!("STDERR: {stderr}"));
    }
    if let Some(code) = data.get("returncode").and_then(Value::as_i64).filter(|c| *c != 0) {
        parts.push(format!("(exit code: {code})"));
    }
    if parts.is_empty() {
        "(no output)".to_string()
    } else {
        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_exec_result_joins_stdout_stderr_and_error() {
        let data = json!({"stdout": "ok\n", "stderr": "warn\n", "error": {"type": "ValueError", "message": "bad"}});
        let text = format_exec_result(&data);
        assert!(text.contains("ok"));
        assert!(text.contains("STDERR: warn"));
        assert!(text.contains("ERROR (ValueError): bad"));
    }

    #[test]
    fn format_exec_result_falls_back_to_no_output() {
        assert_eq!(format_exec_result(&json!({})), "(no output)");
    }

    #[test]
    fn format_shell_result_reports_nonzero_exit_code() {
        let data = json!({"stdout": "", "stderr": "", "returncode": 2});
        assert_eq!(format_shell_result(&data), "(exit code: 2)");
    }

    #[test]
    fn format_shell_result_omits_zero_exit_code() {
        let data = json!({"stdout": "done\n", "stderr": "", "returncode": 0});
        assert_eq!(format_shell_result(&data), "done\n");
    }
}
