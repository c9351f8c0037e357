// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider resolution, grounded in `agent.py::_resolve_provider` (spec §4.4,
//! SPEC_FULL.md §4.4 "Provider resolution order"): explicit request field,
//! then `LLM_PROVIDER` env var, then whichever API key is present,
//! defaulting to Anthropic.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    OpenAi,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAi => "openai",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "anthropic" => Some(Provider::Anthropic),
            "openai" => Some(Provider::OpenAi),
            _ => None,
        }
    }
}

/// `env_get` is injected so tests can resolve against a fake environment
/// instead of racing real process env vars across parallel test threads.
pub fn resolve_provider(explicit: Option<&str>, env_get: impl Fn(&str) -> Option<String>) -> Provider {
    if let Some(p) = explicit.and_then(Provider::parse) {
        return p;
    }
    if let Some(p) = env_get("LLM_PROVIDER").as_deref().and_then(Provider::parse) {
        return p;
    }
    if env_get("ANTHROPIC_API_KEY").is_some() {
        return Provider::Anthropic;
    }
    if env_get("OPENAI_API_KEY").is_some() {
        return Provider::OpenAi;
    }
    Provider::Anthropic
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn explicit_argument_wins() {
        let resolved = resolve_provider(Some("openai"), env(&[("ANTHROPIC_API_KEY", "x")]));
        assert_eq!(resolved, Provider::OpenAi);
    }

    #[test]
    fn env_var_wins_over_api_key_presence() {
        let resolved = resolve_provider(None, env(&[("LLM_PROVIDER", "openai"), ("ANTHROPIC_API_KEY", "x")]));
        assert_eq!(resolved, Provider::OpenAi);
    }

    #[test]
    fn falls_back_to_whichever_api_key_is_present() {
        let resolved = resolve_provider(None, env(&[("OPENAI_API_KEY", "x")]));
        assert_eq!(resolved, Provider::OpenAi);
    }

    #[test]
    fn defaults_to_anthropic_when_nothing_is_set() {
        let resolved = resolve_provider(None, env(&[]));
        assert_eq!(resolved, Provider::Anthropic);
    }
}
