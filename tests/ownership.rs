//! Ownership scenarios
//!
//! Owner-scoped tagging: attribution, independence between owners and the
//! shared scope, the force flag on the tagging entry point, and tagger
//! cascades.

mod common;

use common::{book, engine, user};
use folkso::{FolksoError, TagCountQuery, TagOptions, TagStore};

#[test]
fn owners_tag_independently() {
    let engine = engine();
    let novel = book("novel");
    let tom = user("tom");
    let jane = user("jane");

    engine
        .set_owner_tag_list(&tom, &novel, "tags", &engine.parse("ruby, rails"))
        .unwrap();
    engine
        .set_owner_tag_list(&jane, &novel, "tags", &engine.parse("ruby, crafting"))
        .unwrap();

    assert_eq!(
        engine.owner_tag_list(&tom, &novel, "tags").unwrap().names(),
        ["ruby", "rails"]
    );
    assert_eq!(
        engine.owner_tag_list(&jane, &novel, "tags").unwrap().names(),
        ["ruby", "crafting"]
    );
    // The shared scope stays empty.
    assert!(engine.tag_list(&novel, "tags").unwrap().is_empty());
}

#[test]
fn all_tags_unions_owners_and_shared() {
    let engine = engine();
    let novel = book("novel");
    let tom = user("tom");

    engine
        .set_tag_list(&novel, "tags", &engine.parse("ruby"))
        .unwrap();
    engine
        .set_owner_tag_list(&tom, &novel, "tags", &engine.parse("ruby, rails"))
        .unwrap();

    // Union in creation order, the shared and owned "ruby" collapsed.
    assert_eq!(
        engine.all_tags_list(&novel, "tags").unwrap().names(),
        ["ruby", "rails"]
    );
}

#[test]
fn tag_forces_undeclared_contexts_by_default() {
    let engine = engine();
    let novel = book("novel");
    let tom = user("tom");

    engine
        .tag(&tom, &novel, "moods", &engine.parse("gloomy"), TagOptions::default())
        .unwrap();
    assert_eq!(
        engine.owner_tag_list(&tom, &novel, "moods").unwrap().names(),
        ["gloomy"]
    );
}

#[test]
fn checked_tag_rejects_undeclared_context() {
    let engine = engine();
    let novel = book("novel");
    let tom = user("tom");

    let err = engine
        .tag(&tom, &novel, "moods", &engine.parse("gloomy"), TagOptions::checked())
        .unwrap_err();
    assert!(matches!(err, FolksoError::UnknownContext { .. }));
    assert!(engine.owner_tag_list(&tom, &novel, "moods").unwrap().is_empty());
}

#[test]
fn owner_reconciliation_is_minimal_and_idempotent() {
    let engine = engine();
    let novel = book("novel");
    let tom = user("tom");
    let list = engine.parse("ruby, rails");

    let first = engine
        .set_owner_tag_list(&tom, &novel, "tags", &list)
        .unwrap();
    assert_eq!(first.created.len(), 2);

    let second = engine
        .set_owner_tag_list(&tom, &novel, "tags", &list)
        .unwrap();
    assert!(second.is_empty());

    let third = engine
        .set_owner_tag_list(&tom, &novel, "tags", &engine.parse("ruby"))
        .unwrap();
    assert!(third.created.is_empty());
    assert_eq!(third.deleted.len(), 1);
    assert_eq!(third.deleted[0].tag_name(), "rails");
}

#[test]
fn counts_scoped_to_one_owner() {
    let engine = engine();
    let novel = book("novel");
    let tom = user("tom");
    let jane = user("jane");

    engine
        .set_owner_tag_list(&tom, &novel, "tags", &engine.parse("ruby, rails"))
        .unwrap();
    engine
        .set_owner_tag_list(&jane, &novel, "tags", &engine.parse("ruby"))
        .unwrap();

    let counts = engine
        .tag_counts(&TagCountQuery::new().tagger(tom.clone()))
        .unwrap();
    let counted: Vec<_> = counts.iter().map(|c| (c.tag.name.as_str(), c.count)).collect();
    assert_eq!(counted, vec![("rails", 1), ("ruby", 1)]);

    // Unscoped counts see both owners' taggings.
    let counts = engine.tag_counts(&TagCountQuery::new()).unwrap();
    let ruby = counts.iter().find(|c| c.tag.name == "ruby").unwrap();
    assert_eq!(ruby.count, 2);
}

#[test]
fn removing_a_tagger_leaves_other_scopes() {
    let engine = engine();
    let novel = book("novel");
    let tom = user("tom");
    let jane = user("jane");

    engine
        .set_tag_list(&novel, "tags", &engine.parse("ruby"))
        .unwrap();
    engine
        .set_owner_tag_list(&tom, &novel, "tags", &engine.parse("rails, crafting"))
        .unwrap();
    engine
        .set_owner_tag_list(&jane, &novel, "tags", &engine.parse("rails"))
        .unwrap();

    let removed = engine.remove_tagger(&tom).unwrap();
    assert_eq!(removed, 2);

    assert!(engine.owner_tag_list(&tom, &novel, "tags").unwrap().is_empty());
    assert_eq!(engine.tag_list(&novel, "tags").unwrap().names(), ["ruby"]);
    assert_eq!(
        engine.owner_tag_list(&jane, &novel, "tags").unwrap().names(),
        ["rails"]
    );
}

#[test]
fn record_handle_stages_owner_lists() {
    let engine = engine();
    let tom = user("tom");
    let mut record = engine.record(book("novel"));

    // Declared context: validated staging.
    record
        .set_owner_list(&tom, "tags", engine.parse("ruby"))
        .unwrap();
    // Undeclared context: allowed through the forcing entry point only.
    let err = record
        .set_owner_list(&tom, "moods", engine.parse("gloomy"))
        .unwrap_err();
    assert!(matches!(err, FolksoError::UnknownContext { .. }));
    record
        .stage_owner_list(&tom, "moods", engine.parse("gloomy"), TagOptions::default())
        .unwrap();

    // Nothing persisted until save.
    assert!(engine
        .owner_tag_list(&tom, &book("novel"), "tags")
        .unwrap()
        .is_empty());

    let report = record.save().unwrap();
    assert_eq!(report.scopes.len(), 2);
    assert!(report.scopes.iter().all(|s| s.tagger.as_ref() == Some(&tom)));
    assert_eq!(
        engine.owner_tag_list(&tom, &book("novel"), "tags").unwrap().names(),
        ["ruby"]
    );
    assert_eq!(
        engine.owner_tag_list(&tom, &book("novel"), "moods").unwrap().names(),
        ["gloomy"]
    );
}

#[test]
fn same_owner_tagging_twice_leaves_one_row() {
    let engine = engine();
    let novel = book("novel");
    let tom = user("tom");

    engine
        .tag(&tom, &novel, "tags", &engine.parse("ruby"), TagOptions::default())
        .unwrap();
    engine
        .tag(&tom, &novel, "tags", &engine.parse("ruby"), TagOptions::default())
        .unwrap();

    let scope = folkso::TaggingScope::owned(novel.clone(), "tags", tom.clone());
    assert_eq!(engine.store().taggings_for(&scope).unwrap().len(), 1);
}
