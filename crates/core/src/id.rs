// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Short id generation, used for evolve run names and checkpoint directories.

/// Generate a short, filesystem-safe id: a 4-char prefix plus a 12-char
/// nanoid alphabet restricted to lowercase alphanumerics.
pub fn short_id(prefix: &str) -> String {
    const ALPHABET: [char; 36] = [
        '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
        'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
    ];
    let suffix = nanoid::nanoid!(12, &ALPHABET);
    format!("{prefix}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_has_expected_shape() {
        let id = short_id("run");
        assert!(id.starts_with("run-"));
        assert_eq!(id.len(), "run-".len() + 12);
    }

    #[test]
    fn short_id_is_unique_across_calls() {
        let a = short_id("run");
        let b = short_id("run");
        assert_ne!(a, b);
    }
}
