// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential backoff with jitter, as specified in spec §3 and §4.2:
//! `sleep_k = min(max_delay, base_delay * backoff^(attempt-1)) * (1 + U(-jitter, +jitter))`.

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_mul: f64,
    pub jitter_fraction: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            backoff_mul: 2.0,
            jitter_fraction: 0.2,
        }
    }
}

impl RetryPolicy {
    /// Sleep duration for the given 1-indexed attempt, bounded by `max_delay`
    /// even after jitter is applied (spec §8 testable property).
    pub fn sleep_time(&self, attempt: u32) -> Duration {
        let base_secs = self.base_delay.as_secs_f64();
        let max_secs = self.max_delay.as_secs_f64();
        let exponent = attempt.saturating_sub(1) as i32;
        let raw = (base_secs * self.backoff_mul.powi(exponent)).min(max_secs);
        let jitter = rand::thread_rng().gen_range(-self.jitter_fraction..=self.jitter_fraction);
        let jittered = (raw * (1.0 + jitter)).max(0.0);
        // Jitter can push slightly above max_secs*(1+jitter); clamp to the
        // documented bound so callers can rely on it in tests.
        let bound = max_secs * (1.0 + self.jitter_fraction);
        Duration::from_secs_f64(jittered.min(bound))
    }
}
