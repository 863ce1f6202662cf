//! Storage trait definitions

use crate::query::{RelatedQuery, RelatedRecord, TagCount, TagCountQuery};
use crate::reconcile::ReconcilePlan;
use crate::tag::{EntityRef, Tag, TagId, Tagging};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid tag name: {0:?}")]
    InvalidTagName(String),

    #[error("Date parsing error: {0}")]
    DateParse(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One reconciliation scope: the taggings of a record in a context, for one
/// owner (`tagger = None` is the shared "anyone's tags" scope).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggingScope {
    pub taggable: EntityRef,
    pub context: String,
    pub tagger: Option<EntityRef>,
}

impl TaggingScope {
    /// The shared scope of a record's context.
    pub fn shared(taggable: EntityRef, context: impl Into<String>) -> Self {
        Self {
            taggable,
            context: context.into(),
            tagger: None,
        }
    }

    /// An owner-scoped view of a record's context.
    pub fn owned(taggable: EntityRef, context: impl Into<String>, tagger: EntityRef) -> Self {
        Self {
            taggable,
            context: context.into(),
            tagger: Some(tagger),
        }
    }
}

/// Created and deleted taggings from one applied reconciliation.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    pub created: Vec<Tagging>,
    pub deleted: Vec<Tagging>,
}

impl ReconcileOutcome {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty()
    }
}

/// Trait for tagging storage backends
///
/// Implementations must be thread-safe (Send + Sync). Reconciliation for a
/// single scope is not serialized here — concurrent callers racing on the
/// same scope are last-writer-wins and must lock externally if they need
/// stricter ordering. Concurrent tag creation, by contrast, must be
/// tolerated: see [`TagStore::find_or_create_tag`].
pub trait TagStore: Send + Sync {
    // === Tag Operations ===

    /// Look up a tag by exact name.
    fn find_tag(&self, name: &str) -> StorageResult<Option<Tag>>;

    /// Look up a tag by exact name, creating it if absent.
    ///
    /// Must tolerate a concurrent create of the same name: a unique
    /// constraint violation is treated as "the tag now exists" and
    /// re-fetched, never surfaced. A blank name is `InvalidTagName`.
    fn find_or_create_tag(&self, name: &str) -> StorageResult<Tag>;

    /// Every tag row, zero-count tags included, ordered by name.
    fn list_tags(&self) -> StorageResult<Vec<Tag>>;

    /// Number of taggings referencing a tag, across all scopes.
    fn tag_usage(&self, tag_id: TagId) -> StorageResult<u64>;

    // === Tagging Operations ===

    /// The taggings of one scope, ordered by position when present, then by
    /// row id.
    fn taggings_for(&self, scope: &TaggingScope) -> StorageResult<Vec<Tagging>>;

    /// The taggings of a record's context across every owner, in creation
    /// order.
    fn all_taggings_for(
        &self,
        taggable: &EntityRef,
        context: &str,
    ) -> StorageResult<Vec<Tagging>>;

    /// Apply a reconciliation plan to one scope atomically.
    ///
    /// Creates, repositions, and deletes in a single transaction; with
    /// `remove_unused`, tags left with zero taggings anywhere are deleted
    /// in the same transaction.
    fn apply(
        &self,
        scope: &TaggingScope,
        plan: &ReconcilePlan,
        remove_unused: bool,
    ) -> StorageResult<ReconcileOutcome>;

    /// Remove every tagging on a deleted record, applying the unused-tag
    /// policy when asked. Returns the number removed.
    fn remove_taggable(&self, taggable: &EntityRef, remove_unused: bool) -> StorageResult<usize>;

    /// Remove every tagging owned by a deleted tagger, applying the
    /// unused-tag policy when asked. Returns the number removed.
    fn remove_tagger(&self, tagger: &EntityRef, remove_unused: bool) -> StorageResult<usize>;

    // === Aggregate Queries ===

    /// Tag usage counts within the query's scope, deterministically ordered.
    fn tag_counts(&self, query: &TagCountQuery) -> StorageResult<Vec<TagCount>>;

    /// Records of the same kind sharing tags with the query record.
    fn related(&self, query: &RelatedQuery) -> StorageResult<Vec<RelatedRecord>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: TagStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
