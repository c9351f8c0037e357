// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The awake/sleep state machine (spec §4.5), grounded in
//! `examples/original_source/core/daemon.py`'s poll-then-loop shape but
//! replacing its fixed `DAEMON_INTERVAL` sleep with maturity-sampled
//! parameters. Talks to the supervisor, not the kernel directly — the
//! supervisor is what fronts `/chat`, `/digest` and `/ping` externally.

use crate::error::HeartbeatError;
use crate::maturity::{self, PhaseParams};
use async_trait::async_trait;
use std::time::Duration;

const BOOT_MESSAGE: &str = "You just booted. Orient yourself and decide what to do.";
const CONTINUE_MESSAGE: &str = "Continue. What's next?";
const DIGEST_TIMEOUT: Duration = Duration::from_secs(600);

#[async_trait]
pub trait SupervisorClient: Send + Sync {
    async fn ping(&self) -> bool;
    async fn post_chat(&self, message: &str) -> Result<String, HeartbeatError>;
    async fn post_digest(&self, replay_ratio: f64) -> Result<(), HeartbeatError>;
}

pub struct HttpSupervisorClient {
    pub client: reqwest::Client,
    pub base_url: String,
}

#[async_trait]
impl SupervisorClient for HttpSupervisorClient {
    async fn ping(&self) -> bool {
        self.client.get(format!("{}/ping", self.base_url)).send().await.is_ok()
    }

    async fn post_chat(&self, message: &str) -> Result<String, HeartbeatError> {
        let resp = self
            .client
            .post(format!("{}/chat", self.base_url))
            .json(&serde_json::json!({"message": message}))
            .send()
            .await
            .map_err(|e| HeartbeatError::SupervisorUnreachable(e.to_string()))?;
        let body: serde_json::Value =
            resp.json().await.map_err(|e| HeartbeatError::SupervisorUnreachable(e.to_string()))?;
        Ok(body.get("response").and_then(|v| v.as_str()).unwrap_or_default().to_string())
    }

    async fn post_digest(&self, replay_ratio: f64) -> Result<(), HeartbeatError> {
        let request = self
            .client
            .post(format!("{}/digest", self.base_url))
            .json(&serde_json::json!({"replay_ratio": replay_ratio}));
        tokio::time::timeout(DIGEST_TIMEOUT, request.send())
            .await
            .map_err(|_| HeartbeatError::SupervisorUnreachable("digest timed out".to_string()))?
            .map_err(|e| HeartbeatError::SupervisorUnreachable(e.to_string()))?;
        Ok(())
    }
}

/// Poll `/ping` every `poll_interval` until the supervisor answers (spec
/// §4.5 "Polls the kernel port until ready").
pub async fn wait_until_ready(client: &dyn SupervisorClient, poll_interval: Duration) {
    while !client.ping().await {
        tokio::time::sleep(poll_interval).await;
    }
}

/// Runs one awake phase to completion: post a chat each iteration, sleeping
/// the sampled cooldown between posts, until the sleep-probability coin
/// flip breaks the loop (spec §4.5 steps 1-3). Returns the number of
/// heartbeats posted this phase.
pub async fn run_awake_phase(
    client: &dyn SupervisorClient,
    params: PhaseParams,
    first_ever: &mut bool,
) -> Result<u32, HeartbeatError> {
    let mut count: u32 = 0;
    loop {
        let message = if *first_ever { BOOT_MESSAGE } else { CONTINUE_MESSAGE };
        *first_ever = false;

        client.post_chat(message).await?;
        count += 1;

        if count < params.min_awake {
            tokio::time::sleep(Duration::from_secs_f64(params.cooldown_s)).await;
            continue;
        }

        let p = maturity::sleep_probability(count, params.min_awake, params.capacity);
        let roll: f64 = rand::random();
        if roll < p {
            return Ok(count);
        }

        tokio::time::sleep(Duration::from_secs_f64(params.cooldown_s)).await;
    }
}

/// Runs the sleep phase: post `/digest` with the sampled replay ratio and
/// wait for it to complete (spec §4.5 "Sleep phase").
pub async fn run_sleep_phase(client: &dyn SupervisorClient, replay_ratio: f64) -> Result<(), HeartbeatError> {
    client.post_digest(replay_ratio).await
}
