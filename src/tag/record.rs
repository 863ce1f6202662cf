//! Staged tagging state for one host record
//!
//! The host application owns its records and their persistence; before it
//! saves one, it stages the record's raw tag strings here, asks what
//! changed, and applies the whole batch in one call. This replaces
//! framework lifecycle hooks with an explicit handle: stage, inspect,
//! save.

use super::engine::{FolksoEngine, FolksoResult, TagOptions};
use super::entity::EntityRef;
use super::list::TagList;
use crate::storage::{ReconcileOutcome, TagStore, TaggingScope};

/// One reconciled scope within a [`SaveReport`].
#[derive(Debug, Clone)]
pub struct SavedScope {
    pub context: String,
    pub tagger: Option<EntityRef>,
    pub outcome: ReconcileOutcome,
}

/// What a [`TaggedRecord::save`] did, plus the serialized list for every
/// staged context the record's declaration marks as cached — the host
/// writes those into its denormalized columns before its own persist.
#[derive(Debug, Clone, Default)]
pub struct SaveReport {
    pub scopes: Vec<SavedScope>,
    pub cached: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct Staged {
    context: String,
    tagger: Option<EntityRef>,
    desired: TagList,
    /// Stored state at staging time, for change reporting.
    baseline: TagList,
    /// Set when staged through the forcing owner entry point.
    forced: bool,
}

/// A host record's staged tag lists, with change tracking.
pub struct TaggedRecord<'a> {
    engine: &'a FolksoEngine,
    taggable: EntityRef,
    staged: Vec<Staged>,
}

impl FolksoEngine {
    /// Open a staging handle for a host record.
    pub fn record(&self, taggable: EntityRef) -> TaggedRecord<'_> {
        TaggedRecord {
            engine: self,
            taggable,
            staged: Vec::new(),
        }
    }
}

impl<'a> TaggedRecord<'a> {
    pub fn taggable(&self) -> &EntityRef {
        &self.taggable
    }

    /// Stage a raw delimited string for a shared-scope context.
    pub fn set_raw(&mut self, context: &str, raw: &str) -> FolksoResult<()> {
        let list = self.engine.parse(raw);
        self.set_list(context, list)
    }

    /// Stage a tag list for a shared-scope context.
    pub fn set_list(&mut self, context: &str, list: TagList) -> FolksoResult<()> {
        self.stage(context, None, list, false)
    }

    /// Stage an owner's tag list, validating the context.
    pub fn set_owner_list(
        &mut self,
        tagger: &EntityRef,
        context: &str,
        list: TagList,
    ) -> FolksoResult<()> {
        self.stage(context, Some(tagger.clone()), list, false)
    }

    /// Stage an owner's tag list under [`TagOptions`] (the forcing default
    /// skips the declared-context check, mirroring owner tagging).
    pub fn stage_owner_list(
        &mut self,
        tagger: &EntityRef,
        context: &str,
        list: TagList,
        options: TagOptions,
    ) -> FolksoResult<()> {
        self.stage(context, Some(tagger.clone()), list, options.force)
    }

    fn stage(
        &mut self,
        context: &str,
        tagger: Option<EntityRef>,
        desired: TagList,
        forced: bool,
    ) -> FolksoResult<()> {
        if !forced {
            self.engine.validate_context(&self.taggable.kind, context)?;
        }
        if let Some(existing) = self
            .staged
            .iter_mut()
            .find(|s| s.context == context && s.tagger == tagger)
        {
            existing.desired = desired;
            return Ok(());
        }

        let scope = TaggingScope {
            taggable: self.taggable.clone(),
            context: context.to_string(),
            tagger: tagger.clone(),
        };
        let baseline = self
            .engine
            .store()
            .taggings_for(&scope)?
            .iter()
            .map(|t| t.tag_name())
            .collect();

        self.staged.push(Staged {
            context: context.to_string(),
            tagger,
            desired,
            baseline,
            forced,
        });
        Ok(())
    }

    /// The staged list for a shared-scope context, falling back to stored
    /// state.
    pub fn list(&self, context: &str) -> FolksoResult<TagList> {
        match self.staged_entry(context) {
            Some(staged) => Ok(staged.desired.clone()),
            None => self.engine.tag_list(&self.taggable, context),
        }
    }

    /// Whether the shared-scope list differs from the stored state.
    pub fn changed(&self, context: &str) -> bool {
        self.staged_entry(context)
            .map(|s| s.desired != s.baseline)
            .unwrap_or(false)
    }

    /// The (before, after) pair for a changed shared-scope context.
    pub fn change(&self, context: &str) -> Option<(TagList, TagList)> {
        self.staged_entry(context)
            .filter(|s| s.desired != s.baseline)
            .map(|s| (s.baseline.clone(), s.desired.clone()))
    }

    fn staged_entry(&self, context: &str) -> Option<&Staged> {
        self.staged
            .iter()
            .find(|s| s.context == context && s.tagger.is_none())
    }

    /// Reconcile every staged scope and clear the staging state.
    ///
    /// All contexts are validated before anything is applied, so a failed
    /// validation persists nothing. Returns per-scope outcomes plus the
    /// serialized lists for staged cache-declared contexts.
    pub fn save(&mut self) -> FolksoResult<SaveReport> {
        for staged in &self.staged {
            if !staged.forced {
                self.engine
                    .validate_context(&self.taggable.kind, &staged.context)?;
            }
        }

        let mut report = SaveReport::default();
        for staged in &self.staged {
            let preserve_order = self
                .engine
                .preserve_order_for(&self.taggable.kind, &staged.context);
            let scope = TaggingScope {
                taggable: self.taggable.clone(),
                context: staged.context.clone(),
                tagger: staged.tagger.clone(),
            };
            let outcome = self.engine.reconcile(&scope, &staged.desired, preserve_order)?;
            report.scopes.push(SavedScope {
                context: staged.context.clone(),
                tagger: staged.tagger.clone(),
                outcome,
            });

            if staged.tagger.is_none() && self.engine.caches_list(&self.taggable.kind, &staged.context) {
                report
                    .cached
                    .push((staged.context.clone(), self.engine.serialize(&staged.desired)));
            }
        }

        self.staged.clear();
        Ok(report)
    }
}
