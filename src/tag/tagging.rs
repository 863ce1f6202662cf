//! The tagging association
//!
//! One row linking a tag to a taggable record within a named context,
//! optionally attributed to an owning tagger. Rows are created and
//! destroyed exclusively through reconciliation.

use super::entity::EntityRef;
use super::tag::Tag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Surrogate key of a tagging row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaggingId(i64);

impl TaggingId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TaggingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tag applied to one record in one context, optionally owned by a tagger.
///
/// The tuple (tag, taggable, context, tagger) is unique; `tagger = None` is
/// the shared scope and participates in that uniqueness. `position` is set
/// only for contexts declared order-preserving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tagging {
    pub id: TaggingId,
    pub tag: Tag,
    pub taggable: EntityRef,
    pub context: String,
    pub tagger: Option<EntityRef>,
    pub position: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Tagging {
    /// The tag's name, the value reconciliation diffs on.
    pub fn tag_name(&self) -> &str {
        &self.tag.name
    }
}
