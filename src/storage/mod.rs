//! Storage backends for taggings and tags

mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{
    OpenStore, ReconcileOutcome, StorageError, StorageResult, TagStore, TaggingScope,
};
