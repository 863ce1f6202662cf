//! Engine configuration
//!
//! A single immutable value constructed at process start and handed to the
//! engine. Nothing reads configuration from global state; call sites that
//! need different options thread a different `TagConfig` through.

use serde::{Deserialize, Serialize};

/// Options governing tag-list parsing, serialization, and tag lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagConfig {
    /// Delimiter between tag names in a raw list string.
    pub delimiter: String,
    /// Lowercase every parsed tag name.
    pub force_lowercase: bool,
    /// Slug-transform every parsed tag name (implies lowercase).
    pub force_parameterize: bool,
    /// Delete a tag row once its last tagging is removed.
    pub remove_unused_tags: bool,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            force_lowercase: false,
            force_parameterize: false,
            remove_unused_tags: false,
        }
    }
}

impl TagConfig {
    /// Create a configuration with the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different delimiter (default `,`).
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Lowercase parsed tag names.
    pub fn with_lowercase(mut self) -> Self {
        self.force_lowercase = true;
        self
    }

    /// Slug-transform parsed tag names.
    pub fn with_parameterize(mut self) -> Self {
        self.force_parameterize = true;
        self
    }

    /// Delete tags once their last tagging is removed.
    pub fn with_remove_unused_tags(mut self) -> Self {
        self.remove_unused_tags = true;
        self
    }

    /// The string used to join names on output: the delimiter plus a
    /// trailing space, unless the delimiter already ends in whitespace.
    pub fn glue(&self) -> String {
        if self.delimiter.ends_with(char::is_whitespace) {
            self.delimiter.clone()
        } else {
            format!("{} ", self.delimiter)
        }
    }
}
