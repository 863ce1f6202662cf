//! Reconciliation planning
//!
//! Stored taggings are ground truth; a desired `TagList` is the target
//! state. Planning is a pure diff — it reads both and produces the minimal
//! set of changes, leaving unchanged taggings untouched so nothing keyed
//! off row identity is invalidated. Applying a plan is the storage layer's
//! job and happens inside one transaction.

use crate::tag::{TagList, Tagging, TaggingId};
use serde::{Deserialize, Serialize};

/// A tagging to create: the tag name and, for order-preserving contexts,
/// its position within the desired list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedAdd {
    pub name: String,
    pub position: Option<i64>,
}

/// The minimal change set bringing one scope's taggings in line with a
/// desired list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilePlan {
    pub add: Vec<PlannedAdd>,
    pub remove: Vec<TaggingId>,
    /// Kept taggings whose stored position no longer matches the desired
    /// list. Only produced for order-preserving contexts.
    pub reposition: Vec<(TaggingId, i64)>,
}

impl ReconcilePlan {
    /// An empty plan means no storage writes at all.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty() && self.reposition.is_empty()
    }
}

/// Diff current taggings against a desired list.
///
/// Names present in both sides are kept as-is (no delete/recreate churn).
/// With `preserve_order`, every name's position is its index in `desired`,
/// and kept taggings whose stored position differs are repositioned — a
/// pure order change with an identical name set still produces writes.
pub fn plan(current: &[Tagging], desired: &TagList, preserve_order: bool) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();

    for tagging in current {
        match desired.names().iter().position(|n| n == tagging.tag_name()) {
            Some(idx) if preserve_order => {
                let position = idx as i64;
                if tagging.position != Some(position) {
                    plan.reposition.push((tagging.id, position));
                }
            }
            Some(_) => {}
            None => plan.remove.push(tagging.id),
        }
    }

    for (idx, name) in desired.iter().enumerate() {
        if !current.iter().any(|t| t.tag_name() == name) {
            plan.add.push(PlannedAdd {
                name: name.to_string(),
                position: preserve_order.then_some(idx as i64),
            });
        }
    }

    plan
}
