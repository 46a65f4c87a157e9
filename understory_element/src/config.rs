// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree configuration.

use serde::Deserialize;
use understory_schema::DEFAULT_UID_PREFIX;

/// Runtime knobs of an [`ElementTree`](crate::ElementTree).
///
/// Every field has a default, so partial JSON is accepted:
///
/// ```rust
/// use understory_element::TreeConfig;
///
/// let config = TreeConfig::from_json(r#"{ "cloneToken": "copy" }"#).unwrap();
/// assert_eq!(config.clone_token, "copy");
/// assert_eq!(config.uid_prefix, "__");
/// assert!(config.check_property_types);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct TreeConfig {
    /// Prefix of generated element ids.
    pub uid_prefix: String,
    /// Token whose counter generates clone suffixes.
    pub clone_token: String,
    /// Warn when a typed setter stores a value that does not match the
    /// declared property type.
    pub check_property_types: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            uid_prefix: DEFAULT_UID_PREFIX.to_owned(),
            clone_token: "clone".to_owned(),
            check_property_types: true,
        }
    }
}

impl TreeConfig {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns the parser error for malformed JSON or unknown keys.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
