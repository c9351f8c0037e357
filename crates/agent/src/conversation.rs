// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two-dialect conversation loop (spec §4.4 "Conversation loop"),
//! grounded in `agent.py::_agent_loop_anthropic` /
//! `_agent_loop_openai`: both alternate
//! `assistant-with-tool-calls -> user-with-tool-results -> ...`, terminating
//! on a turn with no tool calls.

use crate::dispatch::Dispatcher;
use crate::error::AgentError;
use crate::tools::{to_anthropic, to_openai, ToolSpec};
use bbos_core::{ChatMessage, Role};
use serde_json::{json, Value};

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_TOKENS: u32 = 8192;

fn non_system_messages(history: &[ChatMessage]) -> Vec<Value> {
    history
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| json!({"role": serde_json::to_value(m.role).unwrap_or(json!("user")), "content": m.content}))
        .collect()
}

pub async fn agent_loop_anthropic(
    client: &reqwest::Client,
    api_key: &str,
    model: &str,
    system_prompt: &str,
    history: &[ChatMessage],
    tools: &[ToolSpec],
    dispatcher: &Dispatcher,
) -> Result<String, AgentError> {
    let anthropic_tools = to_anthropic(tools);
    let mut api_messages = non_system_messages(history);

    loop {
        let body = json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "system": system_prompt,
            "messages": api_messages,
            "tools": anthropic_tools,
        });

        let resp = client
            .post(ANTHROPIC_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|source| AgentError::Request { provider: "anthropic", source })?;
        let data: Value =
            resp.json().await.map_err(|source| AgentError::Request { provider: "anthropic", source })?;

        let content = data.get("content").and_then(Value::as_array).cloned().unwrap_or_default();
        let stop_reason = data.get("stop_reason").and_then(Value::as_str).unwrap_or("end_turn");
        let tool_uses: Vec<&Value> =
            content.iter().filter(|b| b.get("type").and_then(Value::as_str) == Some("tool_use")).collect();

        if stop_reason != "tool_use" || tool_uses.is_empty() {
            let text_parts: Vec<&str> = content
                .iter()
                .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|b| b.get("text").and_then(Value::as_str))
                .collect();
            return Ok(if text_parts.is_empty() { "(no response)".to_string() } else { text_parts.join("\n") });
        }

        api_messages.push(json!({"role": "assistant", "content": content}));

        let mut tool_results = Vec::with_capacity(tool_uses.len());
        for block in tool_uses {
            let name = block.get("name").and_then(Value::as_str).unwrap_or("");
            let id = block.get("id").and_then(Value::as_str).unwrap_or("");
            let arguments = block.get("input").cloned().unwrap_or_else(|| json!({}));
            let result_text = dispatcher.dispatch(name, &arguments).await;
            tool_results.push(json!({"type": "tool_result", "tool_use_id": id, "content": result_text}));
        }
        api_messages.push(json!({"role": "user", "content": tool_results}));
    }
}

pub async fn agent_loop_openai(
    client: &reqwest::Client,
    api_key: &str,
    model: &str,
    system_prompt: &str,
    history: &[ChatMessage],
    tools: &[ToolSpec],
    dispatcher: &Dispatcher,
) -> Result<String, AgentError> {
    let openai_tools = to_openai(tools);
    let mut api_messages = vec![json!({"role": "system", "content": system_prompt})];
    api_messages.extend(non_system_messages(history));

    loop {
        let mut body = json!({
            "model": model,
            "messages": api_messages,
            "max_tokens": MAX_TOKENS,
        });
        if !openai_tools.is_empty() {
            body["tools"] = json!(openai_tools);
        }

        let resp = client
            .post(OPENAI_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| AgentError::Request { provider: "openai", source })?;
        let data: Value =
            resp.json().await.map_err(|source| AgentError::Request { provider: "openai", source })?;

        let choice = data
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|c| c.first())
            .cloned()
            .ok_or(AgentError::EmptyResponse { provider: "openai" })?;
        let message = choice.get("message").cloned().unwrap_or_else(|| json!({}));
        let finish_reason = choice.get("finish_reason").and_then(Value::as_str).unwrap_or("stop");
        let tool_calls = message.get("tool_calls").and_then(Value::as_array).cloned().unwrap_or_default();

        if finish_reason != "tool_calls" || tool_calls.is_empty() {
            let text = message.get("content").and_then(Value::as_str).unwrap_or("(no response)");
            return Ok(text.to_string());
        }

        api_messages.push(message.clone());

        for call in &tool_calls {
            let id = call.get("id").and_then(Value::as_str).unwrap_or("");
            let function = call.get("function").cloned().unwrap_or_else(|| json!({}));
            let name = function.get("name").and_then(Value::as_str).unwrap_or("");
            let arguments: Value = function
                .get("arguments")
                .and_then(Value::as_str)
                .and_then(|s| serde_json::from_str(s).ok())
                .unwrap_or_else(|| json!({}));

            let result_text = dispatcher.dispatch(name, &arguments).await;
            api_messages.push(json!({"role": "tool", "tool_call_id": id, "content": result_text}));
        }
    }
}
