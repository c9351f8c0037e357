// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sleep-phase digest with replay sampling (spec §4.4 "Digest").
//!
//! New history (groups of 10) and new tool-log entries (groups of 20) are
//! chunked, plus a uniformly sampled replay set drawn without replacement
//! from the already-consolidated (pre-cursor) data. Each chunk is submitted
//! to the LLM in turn along with the current learnings document; the
//! learnings doc is overwritten and persisted after every chunk so a crash
//! mid-pass never loses more than the in-flight chunk. Cursors advance only
//! once every chunk in the pass has been attempted (spec §5 ordering
//! guarantee iv).

use crate::error::AgentError;
use crate::provider::Provider;
use async_trait::async_trait;
use bbos_core::{ChatMessage, DigestCursors, ToolLogEntry};
use rand::seq::SliceRandom;
use serde_json::{json, Value};
use std::path::Path;

pub const HISTORY_CHUNK_SIZE: usize = 10;
pub const TOOL_CHUNK_SIZE: usize = 20;

#[derive(Debug, Clone)]
pub struct DigestResult {
    pub status: &'static str,
    pub chunks_processed: usize,
    pub replays: usize,
    pub cursors: DigestCursors,
    pub learnings: String,
}

/// Abstracts "ask the LLM to fold one chunk into the learnings document" so
/// the chunking/replay/cursor logic can be tested without a real provider.
#[async_trait]
pub trait Consolidator: Send + Sync {
    async fn consolidate(&self, learnings: &str, brain_text: &str, chunk_text: &str) -> Result<String, AgentError>;
}

pub struct LlmConsolidator {
    pub client: reqwest::Client,
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
}

#[async_trait]
impl Consolidator for LlmConsolidator {
    async fn consolidate(&self, learnings: &str, brain_text: &str, chunk_text: &str) -> Result<String, AgentError> {
        let prompt = format!(
            "You are consolidating recent agent experience into a persistent learnings document.\n\n\
             Brain notes:\n{brain_text}\n\n\
             Current learnings document:\n{learnings}\n\n\
             New experience chunk:\n{chunk_text}\n\n\
             Return the complete, updated learnings document. Preserve unchanged entries."
        );

        match self.provider {
            Provider::Anthropic => {
                let body = json!({
                    "model": self.model,
                    "max_tokens": 4096,
                    "messages": [{"role": "user", "content": prompt}],
                });
                let resp = self
                    .client
                    .post("https://api.anthropic.com/v1/messages")
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", "2023-06-01")
                    .json(&body)
                    .send()
                    .await
                    .map_err(|source| AgentError::Request { provider: "anthropic", source })?;
                let data: Value =
                    resp.json().await.map_err(|source| AgentError::Request { provider: "anthropic", source })?;
                data.get("content")
                    .and_then(Value::as_array)
                    .and_then(|blocks| blocks.first())
                    .and_then(|b| b.get("text"))
                    .and_then(Value::as_str)
                    .map(String::from)
                    .ok_or(AgentError::EmptyResponse { provider: "anthropic" })
            }
            Provider::OpenAi => {
                let body = json!({
                    "model": self.model,
                    "messages": [{"role": "user", "content": prompt}],
                    "max_tokens": 4096,
                });
                let resp = self
                    .client
                    .post("https://api.openai.com/v1/chat/completions")
                    .bearer_auth(&self.api_key)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|source| AgentError::Request { provider: "openai", source })?;
                let data: Value =
                    resp.json().await.map_err(|source| AgentError::Request { provider: "openai", source })?;
                data.get("choices")
                    .and_then(Value::as_array)
                    .and_then(|c| c.first())
                    .and_then(|c| c.get("message"))
                    .and_then(|m| m.get("content"))
                    .and_then(Value::as_str)
                    .map(String::from)
                    .ok_or(AgentError::EmptyResponse { provider: "openai" })
            }
        }
    }
}

fn chunk_history(messages: &[ChatMessage], size: usize) -> Vec<String> {
    messages
        .chunks(size)
        .map(|group| group.iter().map(|m| format!("{:?}: {}", m.role, m.content)).collect::<Vec<_>>().join("\n"))
        .collect()
}

fn chunk_tool_log(entries: &[ToolLogEntry], size: usize) -> Vec<String> {
    entries
        .chunks(size)
        .map(|group| group.iter().filter_map(|e| serde_json::to_string(e).ok()).collect::<Vec<_>>().join("\n"))
        .collect()
}

fn persist_learnings(path: &Path, text: &str) -> Result<(), AgentError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| AgentError::Io { path: parent.to_path_buf(), source })?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, text).map_err(|source| AgentError::Io { path: tmp.clone(), source })?;
    std::fs::rename(&tmp, path).map_err(|source| AgentError::Io { path: path.to_path_buf(), source })
}

#[allow(clippy::too_many_arguments)]
pub async fn run_digest(
    history: &[ChatMessage],
    tool_log: &[ToolLogEntry],
    mut cursors: DigestCursors,
    mut learnings: String,
    learnings_path: &Path,
    brain_text: &str,
    replay_ratio: f64,
    consolidator: &dyn Consolidator,
) -> Result<DigestResult, AgentError> {
    cursors.clamp(history.len(), tool_log.len());

    let new_history = chunk_history(&history[cursors.history_cursor..], HISTORY_CHUNK_SIZE);
    let new_tool_log = chunk_tool_log(&tool_log[cursors.tool_cursor..], TOOL_CHUNK_SIZE);
    let new_chunk_count = new_history.len() + new_tool_log.len();

    let pre_history = chunk_history(&history[..cursors.history_cursor], HISTORY_CHUNK_SIZE);
    let pre_tool_log = chunk_tool_log(&tool_log[..cursors.tool_cursor], TOOL_CHUNK_SIZE);
    let mut replay_pool: Vec<String> = pre_history.into_iter().chain(pre_tool_log).collect();

    if new_chunk_count == 0 && replay_pool.is_empty() {
        return Ok(DigestResult { status: "nothing_new", chunks_processed: 0, replays: 0, cursors, learnings });
    }

    let replay_count = ((new_chunk_count as f64) * replay_ratio).ceil() as usize;
    let replay_count = replay_count.min(replay_pool.len());
    replay_pool.shuffle(&mut rand::thread_rng());
    let replays: Vec<String> = replay_pool.into_iter().take(replay_count).collect();
    let replay_len = replays.len();

    let mut all_chunks = new_history;
    all_chunks.extend(new_tool_log);
    all_chunks.extend(replays);

    let mut chunks_processed = 0;
    for chunk_text in &all_chunks {
        match consolidator.consolidate(&learnings, brain_text, chunk_text).await {
            Ok(updated) => {
                learnings = updated;
                persist_learnings(learnings_path, &learnings)?;
                chunks_processed += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "digest chunk failed, continuing with the rest of the pass");
            }
        }
    }

    cursors.history_cursor = history.len();
    cursors.tool_cursor = tool_log.len();

    Ok(DigestResult { status: "completed", chunks_processed, replays: replay_len, cursors, learnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingConsolidator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Consolidator for CountingConsolidator {
        async fn consolidate(&self, learnings: &str, _brain_text: &str, chunk_text: &str) -> Result<String, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{learnings}\n[{chunk_text}]"))
        }
    }

    fn history_of(n: usize) -> Vec<ChatMessage> {
        (0..n).map(|i| ChatMessage::user(format!("msg {i}"))).collect()
    }

    #[tokio::test]
    async fn nothing_new_when_cursors_are_already_current() {
        let dir = tempfile::tempdir().expect("tempdir");
        let history = history_of(5);
        let cursors = DigestCursors { history_cursor: 5, tool_cursor: 0 };
        let consolidator = CountingConsolidator { calls: AtomicUsize::new(0) };
        let result = run_digest(
            &history,
            &[],
            cursors,
            String::new(),
            &dir.path().join("learnings.md"),
            "",
            0.15,
            &consolidator,
        )
        .await
        .expect("digest");
        assert_eq!(result.status, "nothing_new");
        assert_eq!(result.chunks_processed, 0);
    }

    #[tokio::test]
    async fn chunks_new_history_and_advances_cursor() {
        let dir = tempfile::tempdir().expect("tempdir");
        let history = history_of(25);
        let consolidator = CountingConsolidator { calls: AtomicUsize::new(0) };
        let result = run_digest(
            &history,
            &[],
            DigestCursors::default(),
            String::new(),
            &dir.path().join("learnings.md"),
            "brain",
            0.0,
            &consolidator,
        )
        .await
        .expect("digest");
        assert_eq!(result.status, "completed");
        assert_eq!(result.chunks_processed, 3, "25 messages / 10 per chunk = 3 chunks");
        assert_eq!(result.cursors.history_cursor, 25);
        assert_eq!(result.replays, 0);
    }

    #[tokio::test]
    async fn cursor_does_not_advance_until_full_pass_completes() {
        struct FailingConsolidator;
        #[async_trait]
        impl Consolidator for FailingConsolidator {
            async fn consolidate(&self, _learnings: &str, _brain_text: &str, _chunk_text: &str) -> Result<String, AgentError> {
                Err(AgentError::EmptyResponse { provider: "anthropic" })
            }
        }
        let dir = tempfile::tempdir().expect("tempdir");
        let history = history_of(10);
        let result = run_digest(
            &history,
            &[],
            DigestCursors::default(),
            String::new(),
            &dir.path().join("learnings.md"),
            "",
            0.0,
            &FailingConsolidator,
        )
        .await
        .expect("digest");
        assert_eq!(result.chunks_processed, 0, "every chunk failed");
        assert_eq!(result.cursors.history_cursor, 10, "cursor still advances at pass end, per spec");
    }

    #[tokio::test]
    async fn samples_replay_chunks_from_pre_cursor_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let history = history_of(30);
        let cursors = DigestCursors { history_cursor: 20, tool_cursor: 0 };
        let consolidator = CountingConsolidator { calls: AtomicUsize::new(0) };
        let result = run_digest(
            &history,
            &[],
            cursors,
            String::new(),
            &dir.path().join("learnings.md"),
            "",
            1.0,
            &consolidator,
        )
        .await
        .expect("digest");
        // 1 new chunk (messages 20..30), replay_ratio=1.0 => ceil(1*1.0)=1 replay from the 2 pre-cursor chunks.
        assert_eq!(result.replays, 1);
        assert_eq!(result.chunks_processed, 2);
    }

    #[tokio::test]
    async fn persists_learnings_after_every_chunk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("learnings.md");
        let history = history_of(10);
        let consolidator = CountingConsolidator { calls: AtomicUsize::new(0) };
        run_digest(&history, &[], DigestCursors::default(), String::new(), &path, "", 0.0, &consolidator)
            .await
            .expect("digest");
        assert!(path.exists());
    }
}
