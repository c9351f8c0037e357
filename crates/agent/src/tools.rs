// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The flat tool catalog (spec §4.4 "Tool discovery"): kernel tools plus
//! remote tool-server tools, all normalized to one shape before being
//! translated per provider dialect.

use crate::schema::sanitize_schema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

pub const EXEC_PYTHON: &str = "exec_python";
pub const RUN_SHELL: &str = "run_shell";
pub const SELF_EVOLVE: &str = "self_evolve";

/// One entry in the flat tool catalog, `{qualified_name, description,
/// input_schema}` as specified in spec §4.4.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// `<brain_dir>/tools.json` re-read on every `/chat` call so the agent can
/// edit its own tool list, matching `_load_kernel_tools`. Falls back to an
/// empty list if the file is absent or malformed.
pub fn load_kernel_tools(brain_dir: &Path) -> Vec<ToolSpec> {
    let path = brain_dir.join("tools.json");
    let Ok(bytes) = std::fs::read(&path) else {
        return Vec::new();
    };
    match serde_json::from_slice::<Vec<ToolSpec>>(&bytes) {
        Ok(tools) => tools,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read kernel tools");
            Vec::new()
        }
    }
}

pub fn is_kernel_tool(name: &str) -> bool {
    matches!(name, EXEC_PYTHON | RUN_SHELL | SELF_EVOLVE)
}

pub fn to_anthropic(tools: &[ToolSpec]) -> Vec<Value> {
    tools
        .iter()
        .map(|t| json!({"name": t.name, "description": t.description, "input_schema": sanitize_schema(&t.input_schema)}))
        .collect()
}

pub fn to_openai(tools: &[ToolSpec]) -> Vec<Value> {
    tools
        .iter()
        .map(|t| {
            json!({
                "type": "function",
                "function": {
                    "name": t.name,
                    "description": t.description,
                    "parameters": sanitize_schema(&t.input_schema),
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tools_file_yields_empty_catalog() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_kernel_tools(dir.path()).is_empty());
    }

    #[test]
    fn malformed_tools_file_yields_empty_catalog() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("tools.json"), "not json").expect("write");
        assert!(load_kernel_tools(dir.path()).is_empty());
    }

    #[test]
    fn loads_well_formed_tools_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("tools.json"),
            r#"[{"name":"exec_python","description":"run code","input_schema":{"type":"object","properties":{"code":{"type":"string"}}}}]"#,
        )
        .expect("write");
        let tools = load_kernel_tools(dir.path());
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "exec_python");
    }

    #[test]
    fn kernel_tool_names_are_recognized() {
        assert!(is_kernel_tool("exec_python"));
        assert!(is_kernel_tool("run_shell"));
        assert!(is_kernel_tool("self_evolve"));
        assert!(!is_kernel_tool("browser-use__click"));
    }
}
