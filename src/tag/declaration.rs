//! Taggable-type declarations
//!
//! Each record kind declares its tagging contexts once at setup: which
//! named dimensions it carries, whether insertion order is preserved, and
//! whether a denormalized cached-list string should be produced on save.
//! Declarations are validated when built and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// One declared tagging context on a record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDecl {
    pub name: String,
    /// Keep taggings in list order via a stored position.
    pub preserve_order: bool,
    /// Produce a serialized list string for the host's cache column on save.
    pub cache_list: bool,
}

/// The full tagging declaration for one record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggableType {
    kind: String,
    contexts: Vec<ContextDecl>,
}

impl TaggableType {
    /// Start a declaration for a record kind.
    ///
    /// # Panics
    /// Panics on a blank kind; declarations are built once at setup and a
    /// blank kind is a programming error, not runtime input.
    pub fn new(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        assert!(!kind.trim().is_empty(), "taggable kind must not be blank");
        Self {
            kind,
            contexts: Vec::new(),
        }
    }

    /// Declare a plain context.
    pub fn context(self, name: impl Into<String>) -> Self {
        self.declare(name.into(), false, false)
    }

    /// Declare a context that preserves tag insertion order.
    pub fn ordered_context(self, name: impl Into<String>) -> Self {
        self.declare(name.into(), true, false)
    }

    /// Declare a context with a denormalized cached-list column on the host.
    pub fn cached_context(self, name: impl Into<String>) -> Self {
        self.declare(name.into(), false, true)
    }

    fn declare(mut self, name: String, preserve_order: bool, cache_list: bool) -> Self {
        self.declare_mut(name, preserve_order, cache_list);
        self
    }

    fn declare_mut(&mut self, name: String, preserve_order: bool, cache_list: bool) {
        assert!(!name.trim().is_empty(), "context name must not be blank");
        match self.contexts.iter_mut().find(|c| c.name == name) {
            Some(existing) => {
                // Re-declaring a context adds capabilities, never removes.
                existing.preserve_order |= preserve_order;
                existing.cache_list |= cache_list;
            }
            None => self.contexts.push(ContextDecl {
                name,
                preserve_order,
                cache_list,
            }),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn contexts(&self) -> &[ContextDecl] {
        &self.contexts
    }

    pub fn context_decl(&self, name: &str) -> Option<&ContextDecl> {
        self.contexts.iter().find(|c| c.name == name)
    }

    pub fn has_context(&self, name: &str) -> bool {
        self.context_decl(name).is_some()
    }

    /// Fold another declaration for the same kind into this one.
    pub(crate) fn merge(&mut self, other: TaggableType) {
        for ctx in other.contexts {
            self.declare_mut(ctx.name, ctx.preserve_order, ctx.cache_list);
        }
    }
}
