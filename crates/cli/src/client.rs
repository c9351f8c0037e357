// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A thin JSON-over-HTTP client to a running supervisor (spec §6 HTTP
//! surface). The CLI never talks to the kernel directly — everything it
//! needs is proxied or implemented by the supervisor.

use anyhow::{bail, Result};
use serde_json::Value;

pub struct SupervisorClient {
    client: reqwest::Client,
    base_url: String,
}

impl SupervisorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        let resp = self.client.get(format!("{}{path}", self.base_url)).send().await?;
        Self::into_json(resp).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let resp = self.client.post(format!("{}{path}", self.base_url)).json(&body).send().await?;
        Self::into_json(resp).await
    }

    async fn into_json(resp: reqwest::Response) -> Result<Value> {
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            bail!("supervisor returned {status}: {body}");
        }
        Ok(body)
    }
}
