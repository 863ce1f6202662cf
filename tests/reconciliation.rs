//! Reconciliation scenarios
//!
//! End-to-end behaviour of set-then-save cycles: minimal churn, order
//! preservation, the unused-tag policy, and the record staging handle.

mod common;

use common::{book, engine, engine_with_config, person, set_languages};
use folkso::{TagConfig, TagStore, TaggingScope};

#[test]
fn second_reconcile_with_same_list_writes_nothing() {
    let engine = engine();
    let alice = person("alice");
    let list = engine.parse("ruby, rails");

    let first = engine.set_tag_list(&alice, "languages", &list).unwrap();
    assert_eq!(first.created.len(), 2);

    let second = engine.set_tag_list(&alice, "languages", &list).unwrap();
    assert!(second.created.is_empty());
    assert!(second.deleted.is_empty());
}

#[test]
fn unchanged_tags_keep_their_rows() {
    let engine = engine();
    let alice = person("alice");
    engine
        .set_tag_list(&alice, "languages", &engine.parse("ruby, php"))
        .unwrap();

    let scope = TaggingScope::shared(alice.clone(), "languages");
    let before = engine.store().taggings_for(&scope).unwrap();

    engine
        .set_tag_list(&alice, "languages", &engine.parse("ruby, java"))
        .unwrap();

    let after = engine.store().taggings_for(&scope).unwrap();
    let ruby_before = before.iter().find(|t| t.tag_name() == "ruby").unwrap();
    let ruby_after = after.iter().find(|t| t.tag_name() == "ruby").unwrap();
    assert_eq!(ruby_before.id, ruby_after.id);
    assert!(!after.iter().any(|t| t.tag_name() == "php"));
}

#[test]
fn empty_list_untags_the_record() {
    let engine = engine();
    set_languages(&engine, "alice", "ruby, rails");

    engine
        .set_tag_list(&person("alice"), "languages", &engine.parse(""))
        .unwrap();
    assert!(engine
        .tag_list(&person("alice"), "languages")
        .unwrap()
        .is_empty());
}

#[test]
fn contexts_are_independent() {
    let engine = engine();
    let alice = person("alice");
    engine
        .set_tag_list(&alice, "languages", &engine.parse("ruby"))
        .unwrap();
    engine
        .set_tag_list(&alice, "skills", &engine.parse("sewing, archery"))
        .unwrap();

    assert_eq!(engine.tag_list(&alice, "languages").unwrap().len(), 1);
    assert_eq!(engine.tag_list(&alice, "skills").unwrap().len(), 2);

    engine
        .set_tag_list(&alice, "skills", &engine.parse(""))
        .unwrap();
    assert_eq!(engine.tag_list(&alice, "languages").unwrap().len(), 1);
}

#[test]
fn ordered_context_assigns_positions_and_repositions() {
    let engine = engine();
    let novel = book("novel");
    engine
        .set_tag_list(&novel, "chapters", &engine.parse("b, a, c"))
        .unwrap();

    let scope = TaggingScope::shared(novel.clone(), "chapters");
    let taggings = engine.store().taggings_for(&scope).unwrap();
    let positions: Vec<_> = taggings
        .iter()
        .map(|t| (t.tag_name().to_string(), t.position))
        .collect();
    assert_eq!(
        positions,
        vec![
            ("b".to_string(), Some(0)),
            ("a".to_string(), Some(1)),
            ("c".to_string(), Some(2)),
        ]
    );

    // Same names, new order: rows survive, only positions change.
    let outcome = engine
        .set_tag_list(&novel, "chapters", &engine.parse("a, b, c"))
        .unwrap();
    assert!(outcome.created.is_empty());
    assert!(outcome.deleted.is_empty());

    let reordered = engine.store().taggings_for(&scope).unwrap();
    let names: Vec<_> = reordered.iter().map(|t| t.tag_name()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    let ids_before: Vec<_> = taggings.iter().map(|t| t.id).collect();
    for tagging in &reordered {
        assert!(ids_before.contains(&tagging.id));
    }
}

#[test]
fn unused_tag_is_deleted_only_under_policy() {
    // Policy on: the tag row goes away with its last tagging.
    let policy_engine = engine_with_config(TagConfig::new().with_remove_unused_tags());
    set_languages(&policy_engine, "alice", "ruby");
    set_languages(&policy_engine, "alice", "");
    assert!(policy_engine.store().find_tag("ruby").unwrap().is_none());

    // Policy off: the row survives with zero taggings.
    let engine = engine();
    set_languages(&engine, "alice", "ruby");
    set_languages(&engine, "alice", "");
    let ruby = engine.store().find_tag("ruby").unwrap().unwrap();
    assert_eq!(engine.store().tag_usage(ruby.id).unwrap(), 0);
}

#[test]
fn shared_tag_survives_policy_while_still_referenced() {
    let engine = engine_with_config(TagConfig::new().with_remove_unused_tags());
    set_languages(&engine, "alice", "ruby");
    set_languages(&engine, "bob", "ruby");

    set_languages(&engine, "alice", "");
    assert!(engine.store().find_tag("ruby").unwrap().is_some());

    set_languages(&engine, "bob", "");
    assert!(engine.store().find_tag("ruby").unwrap().is_none());
}

#[test]
fn record_handle_saves_all_staged_contexts() {
    let engine = engine();
    let mut record = engine.record(book("novel"));
    record.set_raw("tags", "ruby, rails").unwrap();
    record.set_raw("genres", "scifi").unwrap();

    let report = record.save().unwrap();
    assert_eq!(report.scopes.len(), 2);
    assert_eq!(report.cached, vec![("genres".to_string(), "scifi".to_string())]);

    assert_eq!(
        engine.tag_list(&book("novel"), "tags").unwrap().names(),
        ["ruby", "rails"]
    );
    assert_eq!(
        engine.cached_list(&book("novel"), "genres").unwrap(),
        "scifi"
    );
}

#[test]
fn record_handle_tracks_changes_against_stored_state() {
    let engine = engine();
    set_languages(&engine, "alice", "ruby");

    let mut record = engine.record(person("alice"));
    record.set_raw("languages", "ruby, rails").unwrap();
    let (before, after) = record.change("languages").unwrap();
    assert_eq!(before.names(), ["ruby"]);
    assert_eq!(after.names(), ["ruby", "rails"]);

    record.save().unwrap();
    let mut record = engine.record(person("alice"));
    record.set_raw("languages", "ruby, rails").unwrap();
    assert!(!record.changed("languages"));
}

#[test]
fn parse_recovery_does_not_lose_tags_on_save() {
    // Unterminated quoting falls back to the literal interpretation
    // instead of failing the save.
    let engine = engine();
    let alice = person("alice");
    engine
        .set_tag_list(&alice, "languages", &engine.parse(r#"ruby, "rails"#))
        .unwrap();

    let names = engine.tag_list(&alice, "languages").unwrap();
    assert!(names.contains("ruby"));
    assert!(names.contains("\"rails"));
    assert_eq!(names.len(), 2);
}
