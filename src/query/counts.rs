//! Tag usage-count queries

use crate::tag::EntityRef;

/// Result ordering for [`TagCountQuery`].
///
/// Ties are always broken by tag name ascending so results are
/// deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountOrder {
    /// Ascending by count (the default).
    #[default]
    CountAsc,
    /// Descending by count.
    CountDesc,
    /// Ascending by tag name.
    Name,
}

/// Query for tag usage counts, grouped by tag.
///
/// Counts distinct taggings per tag within the given scope. Tags with zero
/// matching taggings never appear; the full vocabulary (zero counts
/// included) is a plain tag scan, not a count query.
#[derive(Debug, Clone, Default)]
pub struct TagCountQuery {
    /// Restrict to one context.
    pub context: Option<String>,
    /// Restrict to taggings on one record kind.
    pub taggable_kind: Option<String>,
    /// Restrict to taggings owned by one tagger.
    pub tagger: Option<EntityRef>,
    /// Keep only tags with at least this many matching taggings.
    pub at_least: Option<u64>,
    /// Keep only tags with at most this many matching taggings.
    pub at_most: Option<u64>,
    /// Result ordering.
    pub order: CountOrder,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl TagCountQuery {
    /// Create a new unrestricted query (counts every tagging).
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one context.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Restrict to taggings on one record kind.
    pub fn taggable_kind(mut self, kind: impl Into<String>) -> Self {
        self.taggable_kind = Some(kind.into());
        self
    }

    /// Restrict to taggings owned by one tagger.
    pub fn tagger(mut self, tagger: EntityRef) -> Self {
        self.tagger = Some(tagger);
        self
    }

    /// Keep only tags used at least this often.
    pub fn at_least(mut self, count: u64) -> Self {
        self.at_least = Some(count);
        self
    }

    /// Keep only tags used at most this often.
    pub fn at_most(mut self, count: u64) -> Self {
        self.at_most = Some(count);
        self
    }

    /// Order the results.
    pub fn order(mut self, order: CountOrder) -> Self {
        self.order = order;
        self
    }

    /// Limit the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
