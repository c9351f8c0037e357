// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The maturity curve and per-cycle parameter sampling (spec §4.5).
//!
//! `maturity` grows the agent's awake/sleep rhythm from "barely awake" to
//! "long, deep focus" as `total_cycles` accumulates. Every sampled
//! parameter is a jittered center rather than a fixed value, so two agents
//! at the same maturity still diverge — matching spec §8's "is a
//! non-decreasing function of total_cycles ignoring jitter" property.

use rand::Rng;

/// `clamp(0, 1, (total_cycles / MATURITY_CYCLES)^GROWTH_CURVE + U(-JITTER, +JITTER))`.
pub fn maturity(total_cycles: u64, cycles: f64, growth_curve: f64, jitter: f64) -> f64 {
    let base = (total_cycles as f64 / cycles).powf(growth_curve);
    let noise = rand::thread_rng().gen_range(-jitter..=jitter);
    (base + noise).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy)]
pub struct PhaseParams {
    pub min_awake: u32,
    pub capacity: f64,
    pub cooldown_s: f64,
    pub replay_ratio: f64,
}

/// Widen a center by a uniform multiplicative jitter in `[0.6, 1.4]`.
fn widened(center: f64) -> f64 {
    let factor = rand::thread_rng().gen_range(0.6..=1.4);
    center * factor
}

/// Sample this cycle's awake/sleep parameters from maturity `m` (spec §4.5
/// "Sampling"). `legacy_cooldown_s` seeds `cooldown_s` in place of its
/// jittered center only before the first real sample has ever been drawn
/// (SPEC_FULL.md §4.5 "Legacy interval mode").
pub fn sample(m: f64, legacy_cooldown_s: Option<f64>) -> PhaseParams {
    let min_awake = widened(1.0 + 7.0 * m).round().max(1.0) as u32;
    let capacity = widened(1.0 + 5.0 * m).max(0.5);
    let cooldown_s = legacy_cooldown_s.unwrap_or_else(|| widened(5.0 + 25.0 * m).max(2.0));
    let replay_jitter = rand::thread_rng().gen_range(-0.08..=0.08);
    let replay_ratio = ((0.5 - 0.4 * m) + replay_jitter).clamp(0.05, 0.60);

    PhaseParams { min_awake, capacity, cooldown_s, replay_ratio }
}

/// `p = 1 - exp(-(count - min_awake) / capacity)` (spec §4.5 step 3).
pub fn sleep_probability(count: u32, min_awake: u32, capacity: f64) -> f64 {
    let overtime = (count.saturating_sub(min_awake)) as f64;
    1.0 - (-overtime / capacity).exp()
}
