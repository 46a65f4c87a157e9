// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generated element ids.

use hashbrown::HashMap;

/// Prefix of generated ids unless configured otherwise.
pub const DEFAULT_UID_PREFIX: &str = "__";

/// Derives the uid token of a class name.
///
/// The token is the last camel-case word of the unqualified name, lower-cased,
/// with characters outside `[A-Za-z0-9-_.:]` and trailing digits removed.
///
/// ```rust
/// use understory_schema::uid_token;
///
/// assert_eq!(uid_token("sap.m.ToggleButton"), "button");
/// assert_eq!(uid_token("Label2"), "label");
/// assert_eq!(uid_token("HTML"), "html");
/// ```
#[must_use]
pub fn uid_token(class_name: &str) -> String {
    let unqualified = class_name.rsplit('.').next().unwrap_or(class_name);

    // Start of the last lower→upper transition.
    let chars: Vec<char> = unqualified.chars().collect();
    let mut start = 0;
    for (i, pair) in chars.windows(2).enumerate() {
        if pair[0].is_ascii_lowercase() && pair[1].is_ascii_uppercase() {
            start = i + 1;
        }
    }

    let mut token: String = chars[start..]
        .iter()
        .filter(|&&c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
        .collect();
    token.truncate(token.trim_end_matches(|c: char| c.is_ascii_digit()).len());
    token.make_ascii_lowercase();
    if token.is_empty() {
        token.push_str("id");
    }
    token
}

/// Monotonic per-token id counters.
///
/// Every token has its own counter, so `button` and `label` ids are numbered
/// independently. Uniqueness comes from the counters alone; generated ids are
/// never checked against existing ones.
///
/// # Example
///
/// ```rust
/// use understory_schema::UidGenerator;
///
/// let mut uids = UidGenerator::new();
/// assert_eq!(uids.next("button"), "__button0");
/// assert_eq!(uids.next("button"), "__button1");
/// assert_eq!(uids.next("label"), "__label0");
/// ```
#[derive(Debug, Clone)]
pub struct UidGenerator {
    prefix: String,
    counts: HashMap<String, u64>,
}

impl Default for UidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl UidGenerator {
    /// Creates a generator using [`DEFAULT_UID_PREFIX`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_UID_PREFIX)
    }

    /// Creates a generator with a custom prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counts: HashMap::new(),
        }
    }

    /// Returns the prefix of generated ids.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns a fresh id for `token`.
    pub fn next(&mut self, token: &str) -> String {
        let count = self.counts.entry_ref(token).or_insert(0);
        let id = format!("{}{token}{count}", self.prefix);
        *count += 1;
        id
    }

    /// Returns `true` if `id` has the shape of a generated id.
    #[must_use]
    pub fn is_generated(&self, id: &str) -> bool {
        !self.prefix.is_empty() && id.starts_with(&self.prefix)
    }
}
