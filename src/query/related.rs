//! Related-record queries

use crate::tag::EntityRef;

/// Query for records of the same kind sharing tags with a given record.
///
/// Ranks by distinct shared-tag count descending, then by the most recent
/// shared tagging, then by record id ascending. The query record itself is
/// excluded.
#[derive(Debug, Clone)]
pub struct RelatedQuery {
    /// The record whose neighbours are wanted.
    pub taggable: EntityRef,
    /// The context the overlap is computed in.
    pub context: String,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl RelatedQuery {
    /// Create a query for records sharing tags with `taggable` in `context`.
    pub fn new(taggable: EntityRef, context: impl Into<String>) -> Self {
        Self {
            taggable,
            context: context.into(),
            limit: None,
        }
    }

    /// Limit the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
