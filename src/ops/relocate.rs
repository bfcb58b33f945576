use std::collections::HashSet;

use serde::Serialize;

use crate::model::gesture::{DragKind, DragSession, DropTarget};
use crate::model::outline::{Collection, LeafId};
use crate::model::selection::SelectionState;
use crate::ops::outline_ops::splice_at;
use crate::ops::selection_ops;

/// Why a gesture left the outline unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoOpReason {
    /// The drop container is not a subsection of the outline
    ContainerNotFound,
    /// None of the dragged IDs are in the outline
    NothingToMove,
    /// A single item dropped onto itself
    SelfDrop,
    /// The session carries a section or subsection, not leaves
    NotALeafDrag,
}

impl std::fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoOpReason::ContainerNotFound => write!(f, "drop target not found"),
            NoOpReason::NothingToMove => write!(f, "nothing to move"),
            NoOpReason::SelfDrop => write!(f, "dropped onto itself"),
            NoOpReason::NotALeafDrag => write!(f, "not a unit drag"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum RelocationStatus {
    Applied,
    Unchanged(NoOpReason),
}

/// Result of a leaf drop: the next outline and selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub collection: Collection,
    pub selection: SelectionState,
    pub status: RelocationStatus,
}

impl Relocation {
    pub fn is_applied(&self) -> bool {
        self.status == RelocationStatus::Applied
    }
}

/// Apply one leaf drag-and-drop gesture.
///
/// On success the selection is cleared. Every "nothing sensible to do"
/// condition returns the inputs unchanged with the reason attached.
pub fn apply_leaf_relocation(
    collection: &Collection,
    selection: &SelectionState,
    session: &DragSession,
    target: &DropTarget,
) -> Relocation {
    let unchanged = |reason: NoOpReason| {
        tracing::debug!(%reason, target = %target.container_id, "relocation skipped");
        Relocation {
            collection: collection.clone(),
            selection: selection.clone(),
            status: RelocationStatus::Unchanged(reason),
        }
    };

    if session.kind != DragKind::Leaf {
        return unchanged(NoOpReason::NotALeafDrag);
    }
    if let ([only], Some(anchor)) = (session.dragged_ids.as_slice(), &target.anchor_leaf_id)
        && only == anchor
    {
        return unchanged(NoOpReason::SelfDrop);
    }

    match plan_relocation(collection, &session.dragged_ids, target) {
        Ok(next) => {
            tracing::debug!(
                moved = session.dragged_ids.len(),
                target = %target.container_id,
                anchor = ?target.anchor_leaf_id,
                "relocation applied"
            );
            let mut selection = selection.clone();
            selection_ops::clear(&mut selection);
            Relocation {
                collection: next,
                selection,
                status: RelocationStatus::Applied,
            }
        }
        Err(reason) => unchanged(reason),
    }
}

/// Compute the outline after moving `dragged_ids` into the drop target.
///
/// Every dragged ID is stripped from every subsection, then the whole group
/// is inserted contiguously, in its given order, into the target. With an
/// anchor, an upward move lands before the anchor and a downward move within
/// the same subsection lands after it.
pub fn plan_relocation(
    collection: &Collection,
    dragged_ids: &[LeafId],
    target: &DropTarget,
) -> Result<Collection, NoOpReason> {
    if collection.subsection(&target.container_id).is_none() {
        return Err(NoOpReason::ContainerNotFound);
    }

    let group = resident_group(collection, dragged_ids);
    if group.is_empty() {
        return Err(NoOpReason::NothingToMove);
    }
    let dragged: HashSet<&str> = group.iter().map(String::as_str).collect();
    let anchor = target.anchor_leaf_id.as_deref();

    let mut next = collection.clone();
    for sub in next.subsections_mut() {
        if sub.id != target.container_id {
            sub.unit_ids.retain(|id| !dragged.contains(id.as_str()));
            continue;
        }

        let anchor_before = anchor.and_then(|a| sub.unit_ids.iter().position(|id| id == a));
        let first_dragged_before = group
            .iter()
            .find_map(|g| sub.unit_ids.iter().position(|id| id == g));

        sub.unit_ids.retain(|id| !dragged.contains(id.as_str()));

        let insert_at = match anchor.and_then(|a| sub.unit_ids.iter().position(|id| id == a)) {
            // no anchor, a dragged anchor, or an anchor outside this subsection: append
            None => sub.unit_ids.len(),
            Some(base) => match (first_dragged_before, anchor_before) {
                (Some(first), Some(anchor_idx)) if first < anchor_idx => base + 1,
                _ => base,
            },
        };
        splice_at(&mut sub.unit_ids, &group, insert_at);
    }
    Ok(next)
}

/// The dragged IDs that are actually in the outline, first occurrence wins.
fn resident_group(collection: &Collection, dragged_ids: &[LeafId]) -> Vec<LeafId> {
    let mut seen = HashSet::new();
    dragged_ids
        .iter()
        .filter(|id| collection.contains_leaf(id))
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
