// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `/chat` entrypoint (spec §4.4), grounded in `agent.py::handle_chat`:
//! resolve provider, reload history/tools/brain fresh every call, run the
//! two-dialect conversation loop, append and persist the turn.

use crate::config::AgentConfig;
use crate::conversation::{agent_loop_anthropic, agent_loop_openai};
use crate::discovery::{discover_tools, ToolServerConfig};
use crate::dispatch::Dispatcher;
use crate::error::AgentError;
use crate::history::{load_history, save_history};
use crate::provider::{resolve_provider, Provider};
use crate::tools::load_kernel_tools;
use bbos_core::ChatMessage;

pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub provider: Option<&'a str>,
}

pub struct ChatResponse {
    pub response: String,
    pub provider: Provider,
    pub tool_count: usize,
}

#[allow(clippy::too_many_arguments)]
pub async fn handle_chat(
    client: &reqwest::Client,
    config: &AgentConfig,
    kernel_base: &str,
    tool_base: &str,
    tool_servers: &[ToolServerConfig],
    env_get: impl Fn(&str) -> Option<String>,
    request: ChatRequest<'_>,
) -> Result<ChatResponse, AgentError> {
    let provider = resolve_provider(request.provider, &env_get);
    let api_key_var = match provider {
        Provider::Anthropic => "ANTHROPIC_API_KEY",
        Provider::OpenAi => "OPENAI_API_KEY",
    };
    let api_key = env_get(api_key_var).unwrap_or_default();
    let model = match provider {
        Provider::Anthropic => config.anthropic_model.clone(),
        Provider::OpenAi => config.openai_model.clone(),
    };

    let system_prompt = crate::brain::load_system_prompt(config.brain_dir());

    let mut kernel_tools = load_kernel_tools(config.brain_dir());
    let (mut remote_tools, tool_server_map) = discover_tools(client, tool_servers).await;
    kernel_tools.append(&mut remote_tools);
    let tool_count = kernel_tools.len();

    let dispatcher = Dispatcher {
        client: client.clone(),
        kernel_base: kernel_base.to_string(),
        tool_base: tool_base.to_string(),
        tool_server_map,
    };

    let mut history = load_history(&config.chat_history_path());
    history.push(ChatMessage::user(request.message));

    let response = match provider {
        Provider::Anthropic => {
            agent_loop_anthropic(client, &api_key, &model, &system_prompt, &history, &kernel_tools, &dispatcher).await?
        }
        Provider::OpenAi => {
            agent_loop_openai(client, &api_key, &model, &system_prompt, &history, &kernel_tools, &dispatcher).await?
        }
    };

    history.push(ChatMessage::assistant(response.clone()));
    save_history(&config.chat_history_path(), &history)?;

    Ok(ChatResponse { response, provider, tool_count })
}
