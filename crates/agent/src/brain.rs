// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! System-prompt assembly, grounded in
//! `examples/original_source/core/agent.py::_load_system_prompt`
//! (SPEC_FULL.md §3 "System prompt assembly"): concatenate every file under
//! the brain directory in sorted filename order, joined by blank lines, so
//! operators can layer `00-core.md`, `10-extra.md`, etc.

use std::path::Path;

const DEFAULT_PROMPT: &str = "You are an AI agent running inside a container. Use the tools to accomplish tasks.";

pub fn load_system_prompt(brain_dir: &Path) -> String {
    let Ok(mut entries) = std::fs::read_dir(brain_dir) else {
        return DEFAULT_PROMPT.to_string();
    };

    let mut names: Vec<_> = entries.by_ref().filter_map(|e| e.ok()).map(|e| e.path()).filter(|p| p.is_file()).collect();
    names.sort();

    let parts: Vec<String> = names
        .into_iter()
        .filter_map(|path| match std::fs::read_to_string(&path) {
            Ok(text) => Some(text.trim().to_string()),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read brain file");
                None
            }
        })
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        DEFAULT_PROMPT.to_string()
    } else {
        parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_falls_back_to_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prompt = load_system_prompt(&dir.path().join("missing"));
        assert_eq!(prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn empty_directory_falls_back_to_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prompt = load_system_prompt(dir.path());
        assert_eq!(prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn concatenates_files_in_sorted_filename_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("10-extra.md"), "extra").expect("write");
        std::fs::write(dir.path().join("00-core.md"), "core").expect("write");
        let prompt = load_system_prompt(dir.path());
        assert_eq!(prompt, "core\n\nextra");
    }
}
