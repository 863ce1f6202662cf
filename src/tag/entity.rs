//! Typed references to external records
//!
//! Taggable records and taggers live in the host application; the engine
//! only ever sees them as a type tag plus an opaque id.

use serde::{Deserialize, Serialize};

/// A discriminated reference to a host-application record.
///
/// `kind` names the record type (e.g. "book", "user") and `id` is whatever
/// identifier the host uses, carried opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: String,
    pub id: String,
}

impl EntityRef {
    /// Create a reference from a record type name and an opaque id.
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(EntityRef::new("book", "42").to_string(), "book:42");
    }

    #[test]
    fn test_equality_is_kind_and_id() {
        assert_eq!(EntityRef::new("book", "1"), EntityRef::new("book", "1"));
        assert_ne!(EntityRef::new("book", "1"), EntityRef::new("user", "1"));
    }
}
