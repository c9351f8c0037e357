// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent-loop configuration (spec §6 "Environment variables"), resolved
//! once by the owning supervisor process and threaded into every call —
//! matching the teacher's `Config::load()` pattern of fixed defaults
//! overridable by environment.

use std::path::{Path, PathBuf};

const DEFAULT_MEMORY_DIR: &str = ".memory";
const DEFAULT_BRAIN_DIR: &str = "./brain";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub memory_dir: PathBuf,
    pub brain_dir: PathBuf,
    pub anthropic_model: String,
    pub openai_model: String,
}

impl AgentConfig {
    pub fn load(env_get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            memory_dir: env_get("BBOS_MEMORY_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_MEMORY_DIR)),
            brain_dir: env_get("BBOS_BRAIN_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_BRAIN_DIR)),
            anthropic_model: env_get("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            openai_model: env_get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        }
    }

    pub fn chat_history_path(&self) -> PathBuf {
        self.memory_dir.join("chat_history.json")
    }

    pub fn tool_log_path(&self) -> PathBuf {
        self.memory_dir.join("tool_log.jsonl")
    }

    pub fn learnings_path(&self) -> PathBuf {
        self.memory_dir.join("learnings.md")
    }

    pub fn digest_state_path(&self) -> PathBuf {
        self.memory_dir.join("digest_state.json")
    }

    pub fn brain_dir(&self) -> &Path {
        &self.brain_dir
    }
}
