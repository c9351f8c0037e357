// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Current working directory plus an env overlay, layered atop the process
/// environment at command-run time. Lazily defaults to `/root` with an
/// empty overlay (spec §3 Shell Context) and round-trips through any state
/// snapshot (checkpoint, cryo) as plain JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellContext {
    pub cwd: String,
    pub env: IndexMap<String, String>,
}

impl Default for ShellContext {
    fn default() -> Self {
        Self { cwd: "/root".to_string(), env: IndexMap::new() }
    }
}

impl ShellContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cd(&mut self, path: impl Into<String>) {
        self.cwd = path.into();
    }

    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env.insert(key.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cwd_is_root_with_empty_env() {
        let ctx = ShellContext::default();
        assert_eq!(ctx.cwd, "/root");
        assert!(ctx.env.is_empty());
    }

    #[test]
    fn cd_and_set_env_mutate_in_place() {
        let mut ctx = ShellContext::default();
        ctx.cd("/tmp");
        ctx.set_env("MY_VAR", "value");
        assert_eq!(ctx.cwd, "/tmp");
        assert_eq!(ctx.env.get("MY_VAR"), Some(&"value".to_string()));
    }

    #[test]
    fn round_trips_through_json() {
        let mut ctx = ShellContext::default();
        ctx.cd("/srv");
        ctx.set_env("FOO", "bar");
        let json = serde_json::to_string(&ctx).expect("serialize");
        let restored: ShellContext = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.cwd, "/srv");
        assert_eq!(restored.env.get("FOO"), Some(&"bar".to_string()));
    }
}
