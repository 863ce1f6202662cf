//! Common test utilities
//!
//! Shared helpers for building engines over in-memory stores with the
//! record kinds the scenarios tag.

#![allow(dead_code)]

use folkso::{EntityRef, FolksoEngine, OpenStore, SqliteStore, TagConfig, TaggableType};
use std::sync::Arc;

/// An engine over a fresh in-memory store with the default configuration.
pub fn engine() -> FolksoEngine {
    engine_with_config(TagConfig::default())
}

/// An engine over a fresh in-memory store with the given configuration.
pub fn engine_with_config(config: TagConfig) -> FolksoEngine {
    let store = SqliteStore::open_in_memory().unwrap();
    let engine = FolksoEngine::new(Arc::new(store), config);
    engine.register(
        TaggableType::new("person")
            .context("languages")
            .context("skills"),
    );
    engine.register(
        TaggableType::new("book")
            .context("tags")
            .ordered_context("chapters")
            .cached_context("genres"),
    );
    engine
}

pub fn person(id: &str) -> EntityRef {
    EntityRef::new("person", id)
}

pub fn book(id: &str) -> EntityRef {
    EntityRef::new("book", id)
}

pub fn user(id: &str) -> EntityRef {
    EntityRef::new("user", id)
}

/// Set a person's languages from a raw list string.
pub fn set_languages(engine: &FolksoEngine, id: &str, raw: &str) {
    engine
        .set_tag_list(&person(id), "languages", &engine.parse(raw))
        .unwrap();
}

/// The tag names of a person's languages, in stored order.
pub fn languages(engine: &FolksoEngine, id: &str) -> Vec<String> {
    engine
        .tag_list(&person(id), "languages")
        .unwrap()
        .into_iter()
        .collect()
}
