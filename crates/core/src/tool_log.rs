// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The tool log and digest cursors (spec §3).
//!
//! The tool log is an append-only, line-delimited JSON file; one
//! [`ToolLogEntry`] per line. Digest cursors record how much of the chat
//! history and tool log a digest pass has already consolidated.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolLogEntry {
    Thinking { ts: u64, text: String },
    Tool { ts: u64, name: String, arguments: serde_json::Value, result: String },
    Digest { ts: u64, chunks_processed: usize, replays: usize, learnings_len: usize },
}

/// Prefix lengths of the history/tool-log already consolidated by digest.
///
/// Invariant (spec §8): monotonically non-decreasing, never exceeding the
/// current log lengths — enforced by [`DigestCursors::clamp`], which callers
/// must apply on load since the underlying files may have been truncated by
/// an operator between runs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DigestCursors {
    pub history_cursor: usize,
    pub tool_cursor: usize,
}

impl DigestCursors {
    /// Clamp both cursors to the current log lengths (spec §3 "Digest Cursors").
    pub fn clamp(&mut self, history_len: usize, tool_len: usize) {
        self.history_cursor = self.history_cursor.min(history_len);
        self.tool_cursor = self.tool_cursor.min(tool_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_never_exceeds_current_lengths() {
        let mut cursors = DigestCursors { history_cursor: 50, tool_cursor: 80 };
        cursors.clamp(10, 20);
        assert_eq!(cursors.history_cursor, 10);
        assert_eq!(cursors.tool_cursor, 20);
    }

    #[test]
    fn clamp_is_a_no_op_when_within_bounds() {
        let mut cursors = DigestCursors { history_cursor: 5, tool_cursor: 5 };
        cursors.clamp(10, 10);
        assert_eq!(cursors.history_cursor, 5);
        assert_eq!(cursors.tool_cursor, 5);
    }
}
