// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::LazyLock};

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"]*"|'[^']*'"#).unwrap());
// Hex literals must be scrubbed before plain numbers, otherwise the digits
// inside `0x7f` get replaced piecemeal.
static HEX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b0[xX][0-9a-fA-F]+\b").unwrap());
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static PLACEHOLDER: &str = "#";

/// Decides whether two failure messages describe the same underlying
/// failure.
pub trait SimilarityMatcher: fmt::Debug {
    /// Returns true if the two messages are similar.
    ///
    /// An empty message is similar to nothing, not even another empty
    /// message, so scenarios without a usable message never group together.
    fn is_similar(&self, a: &str, b: &str) -> bool;
}

/// Which run-specific details are ignored when comparing failure messages.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SimilarityRules {
    /// Ignore decimal number literals, e.g. line numbers and timings.
    pub ignore_numbers: bool,
    /// Ignore `0x`-prefixed hex literals, e.g. addresses.
    pub ignore_hex_values: bool,
    /// Ignore single- and double-quoted substrings, e.g. interpolated
    /// values.
    pub ignore_quoted: bool,
}

impl Default for SimilarityRules {
    fn default() -> Self {
        Self {
            ignore_numbers: true,
            ignore_hex_values: true,
            ignore_quoted: true,
        }
    }
}

/// Compares failure messages after scrubbing the details that vary between
/// occurrences of the same failure.
///
/// Two messages are similar when their scrubbed forms are equal. Whitespace
/// is always collapsed; everything else is controlled by
/// [`SimilarityRules`].
#[derive(Clone, Debug, Default)]
pub struct NormalizingMatcher {
    rules: SimilarityRules,
}

impl NormalizingMatcher {
    /// Creates a matcher with the given rules.
    pub fn new(rules: SimilarityRules) -> Self {
        Self { rules }
    }

    /// Returns the canonical form a message is compared by.
    pub fn normalize(&self, message: &str) -> String {
        let mut normalized = message.to_owned();
        if self.rules.ignore_quoted {
            normalized = QUOTED_RE.replace_all(&normalized, PLACEHOLDER).into_owned();
        }
        if self.rules.ignore_hex_values {
            normalized = HEX_RE.replace_all(&normalized, PLACEHOLDER).into_owned();
        }
        if self.rules.ignore_numbers {
            normalized = NUMBER_RE.replace_all(&normalized, PLACEHOLDER).into_owned();
        }
        WHITESPACE_RE
            .replace_all(normalized.trim(), " ")
            .into_owned()
    }
}

impl SimilarityMatcher for NormalizingMatcher {
    fn is_similar(&self, a: &str, b: &str) -> bool {
        if a.is_empty() || b.is_empty() {
            return false;
        }
        self.normalize(a) == self.normalize(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;
    use test_strategy::proptest;

    #[test_case(
        "NullPointerException at line 10",
        "NullPointerException at line 42",
        true;
        "line numbers are scrubbed"
    )]
    #[test_case(
        "NullPointerException at line 10",
        "Timeout after 30 seconds",
        false;
        "different failures stay apart"
    )]
    #[test_case(
        "segfault at 0x7f3a91b2",
        "segfault at 0xDEADBEEF",
        true;
        "hex addresses are scrubbed"
    )]
    #[test_case(
        r#"expected "alice" but got "bob""#,
        r#"expected "carol" but got "dave""#,
        true;
        "quoted values are scrubbed"
    )]
    #[test_case(
        "expected  1.5 \n but got 2.25",
        "expected 99 but got 100",
        true;
        "whitespace and decimals are scrubbed"
    )]
    fn default_rules(a: &str, b: &str, expected: bool) {
        let matcher = NormalizingMatcher::default();
        assert_eq!(matcher.is_similar(a, b), expected);
        assert_eq!(matcher.is_similar(b, a), expected);
    }

    #[test]
    fn empty_messages_are_similar_to_nothing() {
        let matcher = NormalizingMatcher::default();
        assert!(!matcher.is_similar("", ""));
        assert!(!matcher.is_similar("", "boom"));
        assert!(!matcher.is_similar("boom", ""));
    }

    #[test]
    fn rules_can_be_disabled() {
        let matcher = NormalizingMatcher::new(SimilarityRules {
            ignore_numbers: false,
            ..SimilarityRules::default()
        });
        assert!(!matcher.is_similar("at line 10", "at line 42"));
        assert!(matcher.is_similar("at line 10", "at  line \t 10"));
    }

    #[test]
    fn hex_scrub_does_not_depend_on_number_scrub() {
        let matcher = NormalizingMatcher::new(SimilarityRules {
            ignore_numbers: false,
            ignore_hex_values: true,
            ignore_quoted: false,
        });
        assert!(matcher.is_similar("ptr 0x7f3a", "ptr 0xbeef"));
        assert!(!matcher.is_similar("code 7", "code 8"));
    }

    #[proptest]
    fn similarity_is_symmetric(a: String, b: String) {
        let matcher = NormalizingMatcher::default();
        prop_assert_eq!(matcher.is_similar(&a, &b), matcher.is_similar(&b, &a));
    }

    #[proptest]
    fn similarity_is_reflexive_for_non_empty(#[strategy("\\PC{1,40}")] a: String) {
        let matcher = NormalizingMatcher::default();
        prop_assert!(matcher.is_similar(&a, &a));
    }
}
