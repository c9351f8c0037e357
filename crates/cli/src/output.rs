// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text/JSON output selection, matching the teacher CLI's
//! `OutputFormat` / `--format` convention.

use clap::ValueEnum;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn print_json_or(format: OutputFormat, value: &serde_json::Value, text: impl FnOnce(&serde_json::Value)) {
    match format {
        OutputFormat::Json => {
            if let Ok(pretty) = serde_json::to_string_pretty(value) {
                println!("{pretty}");
            }
        }
        OutputFormat::Text => text(value),
    }
}
