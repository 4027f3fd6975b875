//! Key normalization policy.
//!
//! One policy governs property keys, alias names at insertion, and alias
//! lookups. Numeric tokens are never folded.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Case-folding policy for keys and alias names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyPolicy {
    /// When `true`, keys are compared exactly as written.
    pub case_sensitive: bool,
}

impl KeyPolicy {
    /// A policy that compares keys exactly.
    #[must_use]
    pub const fn case_sensitive() -> Self {
        Self {
            case_sensitive: true,
        }
    }

    /// A policy that lower-cases non-numeric keys.
    #[must_use]
    pub const fn case_insensitive() -> Self {
        Self {
            case_sensitive: false,
        }
    }

    /// Normalize a key or alias token.
    ///
    /// Borrows when nothing changes.
    #[must_use]
    pub fn normalize<'a>(&self, token: &'a str) -> Cow<'a, str> {
        if self.case_sensitive
            || is_numeric_token(token)
            || !token.chars().any(char::is_uppercase)
        {
            Cow::Borrowed(token)
        } else {
            Cow::Owned(token.to_lowercase())
        }
    }
}

/// Whether `token` is a plain decimal number: `[+-]digits[.digits][e[+-]digits]`.
///
/// `NaN`, `inf` and hex forms are names, not numbers.
#[must_use]
pub fn is_numeric_token(token: &str) -> bool {
    let bytes = token.trim().as_bytes();
    let mut i = 0;
    let at = |i: usize| bytes.get(i).copied();

    if matches!(at(i), Some(b'+' | b'-')) {
        i = i.saturating_add(1);
    }

    let int_start = i;
    while at(i).is_some_and(|b| b.is_ascii_digit()) {
        i = i.saturating_add(1);
    }
    let mut digits = i.saturating_sub(int_start);

    if at(i) == Some(b'.') {
        i = i.saturating_add(1);
        let frac_start = i;
        while at(i).is_some_and(|b| b.is_ascii_digit()) {
            i = i.saturating_add(1);
        }
        digits = digits.saturating_add(i.saturating_sub(frac_start));
    }

    if digits == 0 {
        return false;
    }

    if matches!(at(i), Some(b'e' | b'E')) {
        i = i.saturating_add(1);
        if matches!(at(i), Some(b'+' | b'-')) {
            i = i.saturating_add(1);
        }
        let exp_start = i;
        while at(i).is_some_and(|b| b.is_ascii_digit()) {
            i = i.saturating_add(1);
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}
