//! Folkso: Embeddable Tagging Engine
//!
//! An in-process engine for associating records with free-form labels under
//! independent named contexts, and for querying aggregate tag statistics.
//!
//! # Core Concepts
//!
//! - **Tags**: canonical, uniquely-named labels, created lazily on first use
//! - **Taggings**: associations between a tag, a record, a context, and an
//!   optional owning tagger
//! - **Tag lists**: ordered, deduplicated name lists parsed from delimited
//!   strings and reconciled against stored taggings with minimal churn
//!
//! # Example
//!
//! ```
//! use folkso::{EntityRef, FolksoEngine, OpenStore, SqliteStore, TaggableType};
//! use std::sync::Arc;
//!
//! let store = SqliteStore::open_in_memory().unwrap();
//! let engine = FolksoEngine::with_store(Arc::new(store));
//! engine.register(TaggableType::new("book").context("tags"));
//!
//! let book = EntityRef::new("book", "1");
//! engine.set_tag_list(&book, "tags", &engine.parse("ruby, rails")).unwrap();
//! assert_eq!(engine.tag_list(&book, "tags").unwrap().names(), ["ruby", "rails"]);
//! ```

pub mod query;
pub mod reconcile;
pub mod storage;
mod tag;

pub use query::{tag_cloud, CountOrder, RelatedQuery, RelatedRecord, TagCount, TagCountQuery};
pub use storage::{
    OpenStore, ReconcileOutcome, SqliteStore, StorageError, StorageResult, TagStore, TaggingScope,
};
pub use tag::{
    ContextDecl, EntityRef, FolksoEngine, FolksoError, FolksoResult, ParseError, SaveReport,
    SavedScope, Tag, TagConfig, TagId, TagList, TagOptions, TaggableType, TaggedRecord, Tagging,
    TaggingId,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
