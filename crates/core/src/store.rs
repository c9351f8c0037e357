// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic JSON file persistence shared by the agent loop, heartbeat daemon
//! and supervisor. Every "write a whole document" operation in the spec
//! (chat history, digest cursors, daemon state) goes through [`save_json`],
//! which writes to a temp file and renames into place so a crash mid-write
//! never leaves a half-written document (spec §5 "Ordering guarantees").

use crate::error::CoreError;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Load a JSON document, returning `default` if the file does not exist.
pub fn load_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, CoreError> {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map_err(|source| CoreError::Json { path: path.to_path_buf(), source }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(source) => Err(CoreError::Io { path: path.to_path_buf(), source }),
    }
}

/// Write a JSON document atomically (write to `<path>.tmp`, then rename).
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CoreError::Io { path: parent.to_path_buf(), source })?;
    }
    let tmp_path = path.with_extension("tmp");
    let body = serde_json::to_vec_pretty(value)
        .map_err(|source| CoreError::Json { path: path.to_path_buf(), source })?;
    fs::write(&tmp_path, &body).map_err(|source| CoreError::Io { path: tmp_path.clone(), source })?;
    fs::rename(&tmp_path, path).map_err(|source| CoreError::Io { path: path.to_path_buf(), source })?;
    Ok(())
}

/// Append one JSON value as a line to a `.jsonl` file, flushing immediately
/// so tool-log writes survive a process crash (spec §5 "Ordering guarantees").
pub fn append_jsonl<T: Serialize>(path: &Path, value: &T) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CoreError::Io { path: parent.to_path_buf(), source })?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| CoreError::Io { path: path.to_path_buf(), source })?;
    let mut line = serde_json::to_string(value)
        .map_err(|source| CoreError::Json { path: path.to_path_buf(), source })?;
    line.push('\n');
    file.write_all(line.as_bytes()).map_err(|source| CoreError::Io { path: path.to_path_buf(), source })?;
    file.flush().map_err(|source| CoreError::Io { path: path.to_path_buf(), source })?;
    Ok(())
}

/// Read every line of a `.jsonl` file as a `T`, skipping lines that fail to
/// parse (a corrupted trailing line from a crash mid-append should not take
/// down the rest of the log).
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CoreError> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(CoreError::Io { path: path.to_path_buf(), source }),
    };
    let mut out = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(v) => out.push(v),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping malformed tool-log line");
            }
        }
    }
    Ok(out)
}
