//! Query result rows

use crate::tag::Tag;
use serde::{Deserialize, Serialize};

/// One tag with its matching-tagging count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: Tag,
    pub count: u64,
}

/// Another record of the same kind, ranked by shared-tag overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedRecord {
    /// The opaque id of the related record.
    pub id: String,
    /// Number of distinct tags shared with the query record.
    pub shared_count: u64,
}
