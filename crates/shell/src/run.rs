// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::context::ShellContext;
use serde::Serialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Shell commands are given 300s to complete, matching the original kernel's
/// `subprocess.run(..., timeout=300)` (spec §4.1).
const SHELL_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Serialize)]
pub struct ShellOutcome {
    pub status: &'static str,
    pub stdout: String,
    pub stderr: String,
    pub returncode: i32,
}

impl ShellOutcome {
    fn completed(stdout: String, stderr: String, returncode: i32) -> Self {
        Self { status: "completed", stdout, stderr, returncode }
    }

    fn failed(stderr: impl Into<String>) -> Self {
        Self { status: "failed", stdout: String::new(), stderr: stderr.into(), returncode: -1 }
    }
}

/// Run `command` through `/bin/sh -c`, using the persisted cwd and env
/// overlay from `ctx`. Never returns `Err`: every failure mode (spawn
/// failure, non-UTF8 output, timeout) is folded into a `"failed"`
/// [`ShellOutcome`], matching the original's blanket `except Exception`.
pub async fn run_command(ctx: &ShellContext, command: &str) -> ShellOutcome {
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c")
        .arg(command)
        .current_dir(&ctx.cwd)
        .envs(ctx.env.iter())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(error = %e, "failed to spawn shell command");
            return ShellOutcome::failed(e.to_string());
        }
    };

    match tokio::time::timeout(SHELL_TIMEOUT, child.wait_with_output()).await {
        Ok(Ok(output)) => ShellOutcome::completed(
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            output.status.code().unwrap_or(-1),
        ),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "shell command wait failed");
            ShellOutcome::failed(e.to_string())
        }
        Err(_) => {
            tracing::warn!(command, "shell command timed out after 300s");
            ShellOutcome::failed("command timed out")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_a_simple_command_and_captures_stdout() {
        let ctx = ShellContext::default();
        let out = run_command(&ctx, "echo hello").await;
        assert_eq!(out.status, "completed");
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.returncode, 0);
    }

    #[tokio::test]
    async fn honors_cwd_from_context() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut ctx = ShellContext::default();
        ctx.cd(dir.path().to_string_lossy().to_string());
        let out = run_command(&ctx, "pwd").await;
        assert_eq!(out.status, "completed");
        assert_eq!(out.stdout.trim(), dir.path().to_string_lossy());
    }

    #[tokio::test]
    async fn honors_env_overlay_from_context() {
        let mut ctx = ShellContext::default();
        ctx.set_env("MY_VAR", "from_overlay");
        let out = run_command(&ctx, "echo $MY_VAR").await;
        assert_eq!(out.stdout.trim(), "from_overlay");
    }

    #[tokio::test]
    async fn nonzero_exit_is_still_completed_not_failed() {
        let ctx = ShellContext::default();
        let out = run_command(&ctx, "exit 3").await;
        assert_eq!(out.status, "completed");
        assert_eq!(out.returncode, 3);
    }

    #[tokio::test]
    async fn unknown_command_reports_nonzero_exit() {
        let ctx = ShellContext::default();
        let out = run_command(&ctx, "this-binary-does-not-exist-anywhere").await;
        assert_eq!(out.status, "completed", "sh itself reports command-not-found, not a spawn failure");
        assert_ne!(out.returncode, 0);
    }
}
