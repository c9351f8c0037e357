// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Code Execution Namespace (spec §3), re-architected over `rhai` per
//! spec §9's explicit license: Rust has no embedded `exec()`. A single
//! `rhai::Engine` plus one persistent `rhai::Scope<'static>` stands in for
//! the Python `GLOBAL` dict — bindings made by one `exec` are visible to the
//! next because the scope is never recreated between calls, only on an
//! explicit `reset`.
//!
//! Grounded in `dullfig-AgentOS` (depends on `rhai` in `trigger`/`cloud`) and
//! `stencila-stencila`'s dedicated `kernel-rhai` crate: rhai is the pack's
//! established choice for "user code executes against a long-lived
//! interpreter embedded in a Rust host".

use parking_lot::Mutex;
use rhai::{Dynamic, Engine, Scope};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Reserved scope entries preserved across `reset`, standing in for the
/// Python reserved set `{__name__, runtime, _shell_context}`. rhai has no
/// first-class "runtime object" value to preserve; the equivalent constant
/// is `runtime_version`, and the shell context lives outside the scope
/// entirely (see `bbos_kernel::state::KernelState::shell`).
const NAME_KEY: &str = "__name__";
const RUNTIME_VERSION_KEY: &str = "runtime_version";

pub struct ExecOutcome {
    pub stdout: String,
    pub stderr: String,
    pub error: Option<ExecFailure>,
}

pub struct ExecFailure {
    pub kind: String,
    pub message: String,
    pub traceback: String,
}

pub struct Namespace {
    engine: Engine,
    scope: Mutex<Scope<'static>>,
    stdout: Arc<Mutex<String>>,
    stderr: Arc<Mutex<String>>,
}

impl Namespace {
    pub fn new() -> Self {
        let stdout = Arc::new(Mutex::new(String::new()));
        let stderr = Arc::new(Mutex::new(String::new()));
        let mut engine = Engine::new();

        let stdout_sink = stdout.clone();
        engine.on_print(move |s| {
            let mut buf = stdout_sink.lock();
            buf.push_str(s);
            buf.push('\n');
        });

        let stderr_sink = stderr.clone();
        engine.on_debug(move |s, _source, _pos| {
            let mut buf = stderr_sink.lock();
            buf.push_str(s);
            buf.push('\n');
        });

        Self { engine, scope: Mutex::new(Self::fresh_scope()), stdout, stderr }
    }

    fn fresh_scope() -> Scope<'static> {
        let mut scope = Scope::new();
        scope.push_constant(NAME_KEY, "__main__".to_string());
        scope.push_constant(RUNTIME_VERSION_KEY, env!("CARGO_PKG_VERSION").to_string());
        scope
    }

    /// Evaluate `code` against the persistent scope. Blocking; callers
    /// serialize access through the process-wide exec mutex (spec §5).
    pub fn exec(&self, code: &str) -> ExecOutcome {
        self.stdout.lock().clear();
        self.stderr.lock().clear();

        let mut scope = self.scope.lock();
        let result = self.engine.eval_with_scope::<Dynamic>(&mut scope, code);

        let stdout = self.stdout.lock().clone();
        let stderr = self.stderr.lock().clone();

        match result {
            Ok(_) => ExecOutcome { stdout, stderr, error: None },
            Err(err) => {
                let debug = format!("{err:?}");
                let kind = debug
                    .split(['(', ' '])
                    .next()
                    .filter(|s| !s.is_empty())
                    .unwrap_or("RhaiError")
                    .to_string();
                ExecOutcome {
                    stdout,
                    stderr,
                    error: Some(ExecFailure { kind, message: err.to_string(), traceback: debug }),
                }
            }
        }
    }

    /// Wipes all bindings except the reserved keys (spec §4.1 reset
    /// semantics) and restores a fresh scope.
    pub fn reset(&self) {
        *self.scope.lock() = Self::fresh_scope();
    }

    /// State-only serialization for the `cryo` fallback path (spec §4.3,
    /// §9 "Arbitrary-type serialization"). Per the design note, this is a
    /// closed schema over the values the kernel actually stores rather than
    /// an attempt at universal object serialization: any scope entry whose
    /// `Dynamic` cannot round-trip through `serde_json::Value` (a function
    /// pointer, an opaque native object, ...) is logged and dropped instead
    /// of failing the whole dump.
    pub fn dump(&self) -> Map<String, Value> {
        let scope = self.scope.lock();
        let mut out = Map::new();
        for (name, _is_constant, value) in scope.iter() {
            if name == NAME_KEY || name == RUNTIME_VERSION_KEY {
                continue;
            }
            match rhai::serde::from_dynamic::<Value>(&value) {
                Ok(json) => {
                    out.insert(name.to_string(), json);
                }
                Err(e) => {
                    tracing::warn!(name, error = %e, "skipping non-serializable value during cryo dump");
                }
            }
        }
        out
    }

    /// Restore scope entries from a previously dumped closed-schema map.
    /// Does not reset first — callers that want a clean reload call
    /// [`Namespace::reset`] before `load` (matching `/cryo/reload`'s
    /// `reset`-then-`reload` sequencing, spec §8 testable property).
    pub fn load(&self, values: &Map<String, Value>) {
        let mut scope = self.scope.lock();
        for (name, json) in values {
            match rhai::serde::to_dynamic(json.clone()) {
                Ok(dynamic) => scope.set_or_push(name.clone(), dynamic),
                Err(e) => {
                    tracing::warn!(name, error = %e, "skipping value that could not be restored");
                }
            }
        }
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_from_one_exec_are_visible_in_the_next() {
        let ns = Namespace::new();
        let first = ns.exec("let a = 10;");
        assert!(first.error.is_none());
        let second = ns.exec("print(a + 5);");
        assert!(second.error.is_none(), "{:?}", second.error.map(|e| e.message));
        assert_eq!(second.stdout.trim(), "15");
    }

    #[test]
    fn reset_clears_user_bindings() {
        let ns = Namespace::new();
        ns.exec("let a = 10;");
        ns.reset();
        let after = ns.exec("print(a);");
        assert!(after.error.is_some(), "expected lookup of `a` to fail after reset");
    }

    #[test]
    fn runtime_error_reports_kind_message_and_traceback() {
        let ns = Namespace::new();
        let out = ns.exec("print(undefined_name);");
        let err = out.error.expect("expected an error");
        assert!(!err.kind.is_empty());
        assert!(!err.message.is_empty());
        assert!(!err.traceback.is_empty());
    }

    #[test]
    fn dump_excludes_reserved_keys_and_captures_bound_values() {
        let ns = Namespace::new();
        ns.exec("let a = 10; let name = \"x\";");
        let dumped = ns.dump();
        assert_eq!(dumped.get("a"), Some(&Value::from(10_i64)));
        assert_eq!(dumped.get("name"), Some(&Value::from("x")));
        assert!(!dumped.contains_key(NAME_KEY));
        assert!(!dumped.contains_key(RUNTIME_VERSION_KEY));
    }

    #[test]
    fn load_after_reset_restores_dumped_bindings() {
        let ns = Namespace::new();
        ns.exec("let a = 10;");
        let dumped = ns.dump();
        ns.reset();
        assert!(ns.exec("print(a);").error.is_some(), "a should be gone after reset");
        ns.load(&dumped);
        let after = ns.exec("print(a);");
        assert!(after.error.is_none(), "{:?}", after.error.map(|e| e.message));
        assert_eq!(after.stdout.trim(), "10");
    }

    #[test]
    fn namespace_mutations_survive_a_failed_exec() {
        let ns = Namespace::new();
        ns.exec("let a = 1;");
        let failed = ns.exec("print(a); print(undefined_name);");
        assert!(failed.error.is_some());
        let after = ns.exec("print(a);");
        assert!(after.error.is_none());
        assert_eq!(after.stdout.trim(), "1");
    }
}
