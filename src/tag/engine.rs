//! FolksoEngine: the main entry point for tagging operations

use super::config::TagConfig;
use super::declaration::{ContextDecl, TaggableType};
use super::entity::EntityRef;
use super::list::{ParseError, TagList};
use crate::query::{RelatedQuery, RelatedRecord, TagCount, TagCountQuery};
use crate::reconcile;
use crate::storage::{ReconcileOutcome, StorageError, TagStore, TaggingScope};
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur in engine operations
#[derive(Debug, Error)]
pub enum FolksoError {
    #[error("Unknown taggable type: {0}")]
    UnknownType(String),

    #[error("No context '{context}' declared for type '{kind}'")]
    UnknownContext { kind: String, context: String },

    #[error("Tag list parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for engine operations
pub type FolksoResult<T> = Result<T, FolksoError>;

/// Options for the owner-scoped tagging entry point.
#[derive(Debug, Clone, Copy)]
pub struct TagOptions {
    /// Skip the declared-context check. On by default, matching the
    /// historical behaviour of owner tagging.
    pub force: bool,
}

impl Default for TagOptions {
    fn default() -> Self {
        Self { force: true }
    }
}

impl TagOptions {
    /// Enforce that the context is declared on the target type.
    pub fn checked() -> Self {
        Self { force: false }
    }
}

/// The main tagging engine
///
/// Holds the immutable configuration, the registry of taggable-type
/// declarations, and the store. Reconciliation and aggregation run
/// synchronously against the store; the engine keeps no tagging state of
/// its own.
pub struct FolksoEngine {
    store: Arc<dyn TagStore>,
    config: TagConfig,
    /// Declarations keyed by record kind; written at setup, read everywhere.
    types: DashMap<String, TaggableType>,
}

impl FolksoEngine {
    /// Create an engine over a store with the given configuration.
    pub fn new(store: Arc<dyn TagStore>, config: TagConfig) -> Self {
        Self {
            store,
            config,
            types: DashMap::new(),
        }
    }

    /// Create an engine with the default configuration.
    pub fn with_store(store: Arc<dyn TagStore>) -> Self {
        Self::new(store, TagConfig::default())
    }

    pub fn config(&self) -> &TagConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn TagStore> {
        &self.store
    }

    // === Declarations ===

    /// Register a taggable-type declaration.
    ///
    /// Registering the same kind again merges the new contexts in; declared
    /// capabilities are never removed.
    pub fn register(&self, decl: TaggableType) {
        match self.types.get_mut(decl.kind()) {
            Some(mut existing) => existing.merge(decl),
            None => {
                self.types.insert(decl.kind().to_string(), decl);
            }
        }
    }

    /// Whether a record kind has been registered.
    pub fn is_taggable(&self, kind: &str) -> bool {
        self.types.contains_key(kind)
    }

    /// The declaration for a record kind, if registered.
    pub fn taggable_type(&self, kind: &str) -> Option<TaggableType> {
        self.types.get(kind).map(|entry| entry.clone())
    }

    /// Look up a declared context, failing with the engine's taxonomy.
    fn context_decl(&self, kind: &str, context: &str) -> FolksoResult<ContextDecl> {
        let entry = self
            .types
            .get(kind)
            .ok_or_else(|| FolksoError::UnknownType(kind.to_string()))?;
        entry
            .context_decl(context)
            .cloned()
            .ok_or_else(|| FolksoError::UnknownContext {
                kind: kind.to_string(),
                context: context.to_string(),
            })
    }

    /// Check that a context is declared for a record kind.
    pub fn validate_context(&self, kind: &str, context: &str) -> FolksoResult<()> {
        self.context_decl(kind, context).map(|_| ())
    }

    pub(crate) fn preserve_order_for(&self, kind: &str, context: &str) -> bool {
        self.context_decl(kind, context)
            .map(|decl| decl.preserve_order)
            .unwrap_or(false)
    }

    pub(crate) fn caches_list(&self, kind: &str, context: &str) -> bool {
        self.context_decl(kind, context)
            .map(|decl| decl.cache_list)
            .unwrap_or(false)
    }

    // === Tag lists ===

    /// Parse a raw string into a tag list under the engine's configuration.
    pub fn parse(&self, raw: &str) -> TagList {
        TagList::parse(raw, &self.config)
    }

    /// Serialize a tag list under the engine's configuration.
    pub fn serialize(&self, list: &TagList) -> String {
        list.serialize(&self.config)
    }

    // === Reconciliation ===

    /// Make a record's shared-scope taggings match the desired list.
    ///
    /// The context must be declared on the record's kind. Unchanged tags
    /// are left untouched; an already-matching list produces no writes.
    pub fn set_tag_list(
        &self,
        taggable: &EntityRef,
        context: &str,
        desired: &TagList,
    ) -> FolksoResult<ReconcileOutcome> {
        let decl = self.context_decl(&taggable.kind, context)?;
        let scope = TaggingScope::shared(taggable.clone(), context);
        self.reconcile(&scope, desired, decl.preserve_order)
    }

    /// Make a record's owner-scoped taggings match the desired list.
    pub fn set_owner_tag_list(
        &self,
        tagger: &EntityRef,
        taggable: &EntityRef,
        context: &str,
        desired: &TagList,
    ) -> FolksoResult<ReconcileOutcome> {
        let decl = self.context_decl(&taggable.kind, context)?;
        let scope = TaggingScope::owned(taggable.clone(), context, tagger.clone());
        self.reconcile(&scope, desired, decl.preserve_order)
    }

    /// Owner tagging entry point.
    ///
    /// By default the declared-context check is bypassed (`TagOptions
    /// { force: true }`); `TagOptions::checked()` surfaces
    /// `UnknownContext`/`UnknownType` instead.
    pub fn tag(
        &self,
        tagger: &EntityRef,
        taggable: &EntityRef,
        context: &str,
        desired: &TagList,
        options: TagOptions,
    ) -> FolksoResult<ReconcileOutcome> {
        let preserve_order = if options.force {
            self.context_decl(&taggable.kind, context)
                .map(|decl| decl.preserve_order)
                .unwrap_or(false)
        } else {
            self.context_decl(&taggable.kind, context)?.preserve_order
        };
        let scope = TaggingScope::owned(taggable.clone(), context, tagger.clone());
        self.reconcile(&scope, desired, preserve_order)
    }

    pub(crate) fn reconcile(
        &self,
        scope: &TaggingScope,
        desired: &TagList,
        preserve_order: bool,
    ) -> FolksoResult<ReconcileOutcome> {
        let current = self.store.taggings_for(scope)?;
        let plan = reconcile::plan(&current, desired, preserve_order);
        if plan.is_empty() {
            return Ok(ReconcileOutcome::default());
        }
        tracing::debug!(
            taggable = %scope.taggable,
            context = %scope.context,
            adds = plan.add.len(),
            removes = plan.remove.len(),
            "reconciling tag list"
        );
        Ok(self
            .store
            .apply(scope, &plan, self.config.remove_unused_tags)?)
    }

    // === Reads ===

    /// The record's shared-scope tag list, in stored order.
    pub fn tag_list(&self, taggable: &EntityRef, context: &str) -> FolksoResult<TagList> {
        let scope = TaggingScope::shared(taggable.clone(), context);
        let taggings = self.store.taggings_for(&scope)?;
        Ok(taggings.iter().map(|t| t.tag_name()).collect())
    }

    /// One owner's tag list for a record's context.
    pub fn owner_tag_list(
        &self,
        tagger: &EntityRef,
        taggable: &EntityRef,
        context: &str,
    ) -> FolksoResult<TagList> {
        let scope = TaggingScope::owned(taggable.clone(), context, tagger.clone());
        let taggings = self.store.taggings_for(&scope)?;
        Ok(taggings.iter().map(|t| t.tag_name()).collect())
    }

    /// The union of every owner's tags on a record's context, in creation
    /// order, duplicates removed.
    pub fn all_tags_list(&self, taggable: &EntityRef, context: &str) -> FolksoResult<TagList> {
        let taggings = self.store.all_taggings_for(taggable, context)?;
        Ok(taggings.iter().map(|t| t.tag_name()).collect())
    }

    /// The serialized shared-scope list, ready for a host cache column.
    pub fn cached_list(&self, taggable: &EntityRef, context: &str) -> FolksoResult<String> {
        Ok(self.tag_list(taggable, context)?.serialize(&self.config))
    }

    // === Aggregates ===

    /// Tag usage counts; see [`TagCountQuery`].
    pub fn tag_counts(&self, query: &TagCountQuery) -> FolksoResult<Vec<TagCount>> {
        Ok(self.store.tag_counts(query)?)
    }

    /// Records sharing tags with `taggable` in `context`, ranked by
    /// overlap.
    pub fn related(
        &self,
        taggable: &EntityRef,
        context: &str,
        limit: Option<usize>,
    ) -> FolksoResult<Vec<RelatedRecord>> {
        let mut query = RelatedQuery::new(taggable.clone(), context);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        Ok(self.store.related(&query)?)
    }

    // === Cascades ===

    /// Drop every tagging on a deleted record.
    pub fn remove_taggable(&self, taggable: &EntityRef) -> FolksoResult<usize> {
        Ok(self
            .store
            .remove_taggable(taggable, self.config.remove_unused_tags)?)
    }

    /// Drop every tagging owned by a deleted tagger.
    pub fn remove_tagger(&self, tagger: &EntityRef) -> FolksoResult<usize> {
        Ok(self
            .store
            .remove_tagger(tagger, self.config.remove_unused_tags)?)
    }
}
