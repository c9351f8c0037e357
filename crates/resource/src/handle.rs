// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`ResourceHandle<T>`] — the reconnectable wrapper itself (spec §4.2).

use crate::retry::RetryPolicy;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("resource connection failed after {attempts} attempt(s): {last}")]
    ConnectionFailed { attempts: u32, last: String },

    #[error("resource validation failed after connecting")]
    ValidationFailed,
}

type Factory<T> = dyn Fn() -> Result<T, String> + Send + Sync;
type OnConnect<T> = dyn Fn(&mut T) -> Result<(), String> + Send + Sync;
type Validator<T> = dyn Fn(&T) -> bool + Send + Sync;
type Teardown<T> = dyn Fn(&mut T) + Send + Sync;

struct Inner<T> {
    conn: Option<T>,
    stale: bool,
}

/// Reconnectable wrapper over one external resource.
///
/// Construct via [`crate::ResourceRegistry::register`], configure with the
/// fluent `on_connect`/`validate`/`teardown`/`retry` setters, then call
/// [`acquire`](Self::acquire) to get a live, validated connection.
pub struct ResourceHandle<T> {
    inner: Mutex<Inner<T>>,
    factory: Box<Factory<T>>,
    on_connect: Option<Box<OnConnect<T>>>,
    validate: Option<Box<Validator<T>>>,
    teardown: Option<Box<Teardown<T>>>,
    retry: RetryPolicy,
}

impl<T> ResourceHandle<T> {
    /// `stale` starts `true` so the first `acquire()` always rebuilds, even
    /// on a process's very first boot (spec §9 Open Questions: preserved
    /// intentionally rather than special-cased away).
    pub fn new(factory: impl Fn() -> Result<T, String> + Send + Sync + 'static) -> Self {
        Self {
            inner: Mutex::new(Inner { conn: None, stale: true }),
            factory: Box::new(factory),
            on_connect: None,
            validate: None,
            teardown: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn on_connect(mut self, f: impl Fn(&mut T) -> Result<(), String> + Send + Sync + 'static) -> Self {
        self.on_connect = Some(Box::new(f));
        self
    }

    pub fn validate(mut self, f: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.validate = Some(Box::new(f));
        self
    }

    pub fn teardown(mut self, f: impl Fn(&mut T) + Send + Sync + 'static) -> Self {
        self.teardown = Some(Box::new(f));
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    fn healthy(&self, conn: &T) -> bool {
        match &self.validate {
            Some(f) => f(conn),
            None => true,
        }
    }

    fn teardown_conn(&self, conn: &mut T) {
        if let Some(f) = &self.teardown {
            f(conn);
        }
    }

    /// Get the connection, reconnecting if necessary. Blocks the calling
    /// thread for the duration of any retries — by design, concurrent
    /// callers queue behind one reconnect attempt rather than stampeding the
    /// factory (spec §5 "Concurrency & Resource Model"). Connections are
    /// accessed only under the handle's own mutex (spec §3 invariant ii);
    /// since callers need the value to outlive that lock, `T` must be
    /// cheaply `Clone` (a socket handle, an `Arc`-wrapped SDK client, etc).
    pub fn acquire(&self) -> Result<T, ResourceError>
    where
        T: Clone,
    {
        let mut guard = self.inner.lock();

        if let Some(conn) = &guard.conn {
            if !guard.stale && self.healthy(conn) {
                return Ok(conn.clone());
            }
        }

        if let Some(conn) = &mut guard.conn {
            self.teardown_conn(conn);
            guard.conn = None;
        }

        let mut last_err = String::from("resource connection failed");
        for attempt in 1..=self.retry.max_attempts {
            match (self.factory)() {
                Ok(mut conn) => {
                    if let Some(on_connect) = &self.on_connect {
                        if let Err(e) = on_connect(&mut conn) {
                            last_err = e;
                            if attempt < self.retry.max_attempts {
                                thread::sleep(self.retry.sleep_time(attempt));
                            }
                            continue;
                        }
                    }
                    if !self.healthy(&conn) {
                        last_err = "resource validation failed".to_string();
                        if attempt < self.retry.max_attempts {
                            thread::sleep(self.retry.sleep_time(attempt));
                        }
                        continue;
                    }
                    guard.conn = Some(conn.clone());
                    guard.stale = false;
                    return Ok(conn);
                }
                Err(e) => {
                    last_err = e;
                    if attempt < self.retry.max_attempts {
                        thread::sleep(self.retry.sleep_time(attempt));
                    }
                }
            }
        }

        Err(ResourceError::ConnectionFailed { attempts: self.retry.max_attempts, last: last_err })
    }
}

/// Handle for bulk registry operations, erased over the connection type.
pub trait Reconnectable: Send + Sync {
    /// Runs teardown (best-effort) and marks the handle stale.
    fn invalidate(&self);
    /// Marks the handle stale without running teardown — the descriptor is
    /// already dead (e.g. after whole-process restore), so there is nothing
    /// safe to tear down.
    fn restored(&self);
}

impl<T: Send> Reconnectable for ResourceHandle<T> {
    fn invalidate(&self) {
        let mut guard = self.inner.lock();
        if let Some(conn) = &mut guard.conn {
            self.teardown_conn(conn);
        }
        guard.conn = None;
        guard.stale = true;
    }

    fn restored(&self) {
        self.inner.lock().stale = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[test]
    fn acquire_reuses_a_healthy_connection() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let handle = ResourceHandle::new(move || {
            calls2.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(42_u32)
        });

        let first = handle.acquire().expect("acquire 1");
        let second = handle.acquire().expect("acquire 2");
        assert_eq!(first, 42);
        assert_eq!(second, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1, "factory should run once");
    }

    #[test]
    fn invalidate_forces_next_acquire_to_rebuild() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let handle = ResourceHandle::new(move || {
            Ok::<_, String>(calls2.fetch_add(1, Ordering::SeqCst))
        });

        handle.acquire().expect("acquire 1");
        handle.invalidate();
        handle.acquire().expect("acquire 2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn restored_forces_next_acquire_to_rebuild_without_teardown() {
        let teardown_calls = Arc::new(AtomicU32::new(0));
        let teardown_calls2 = teardown_calls.clone();
        let factory_calls = Arc::new(AtomicU32::new(0));
        let factory_calls2 = factory_calls.clone();

        let handle = ResourceHandle::new(move || {
            factory_calls2.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(7_u32)
        })
        .teardown(move |_| {
            teardown_calls2.fetch_add(1, Ordering::SeqCst);
        });

        handle.acquire().expect("acquire 1");
        handle.restored();
        handle.acquire().expect("acquire 2");

        assert_eq!(factory_calls.load(Ordering::SeqCst), 2);
        assert_eq!(teardown_calls.load(Ordering::SeqCst), 0, "restored() must not tear down");
    }

    #[test]
    fn acquire_retries_until_success_and_sleeps_at_least_the_base_delay() {
        let attempt = Arc::new(AtomicU32::new(0));
        let attempt2 = attempt.clone();
        let handle = ResourceHandle::new(move || {
            let n = attempt2.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err("first attempt fails".to_string())
            } else {
                Ok::<_, String>(99_u32)
            }
        })
        .retry(RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            backoff_mul: 2.0,
            jitter_fraction: 0.0,
        });

        let start = std::time::Instant::now();
        let value = handle.acquire().expect("acquire after retry");
        assert_eq!(value, 99);
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn acquire_surfaces_last_error_after_exhausting_attempts() {
        let handle: ResourceHandle<u32> = ResourceHandle::new(|| Err("boom".to_string())).retry(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
            backoff_mul: 1.0,
            jitter_fraction: 0.0,
        });

        let err = handle.acquire().unwrap_err();
        match err {
            ResourceError::ConnectionFailed { attempts, last } => {
                assert_eq!(attempts, 3);
                assert_eq!(last, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validation_failure_is_treated_as_connection_failure() {
        let handle = ResourceHandle::new(|| Ok::<_, String>(1_u32))
            .validate(|_| false)
            .retry(RetryPolicy {
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(1),
                backoff_mul: 1.0,
                jitter_fraction: 0.0,
            });

        let err = handle.acquire().unwrap_err();
        assert!(matches!(err, ResourceError::ConnectionFailed { .. }));
    }
}
