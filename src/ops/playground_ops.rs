use std::collections::HashSet;

use crate::model::gesture::{DragKind, DragSession, DropTarget};
use crate::model::outline::{Collection, LeafId};
use crate::model::selection::SelectionState;
use crate::ops::outline_ops::{OutlineError, splice_at};
use crate::ops::relocate::{NoOpReason, RelocationStatus};
use crate::ops::selection_ops;
use crate::ops::token::is_valid_id;

/// Container part of the token that addresses a staged unit
/// (`playground::<unitID>`)
pub const PLAYGROUND_ID: &str = "playground";

// ---------------------------------------------------------------------------
// Staging
// ---------------------------------------------------------------------------

/// Append units to the end of the playground.
///
/// Units that are already staged are skipped. Returns the next playground and
/// the IDs that were actually added, in order.
pub fn stage_units(
    playground: &[LeafId],
    collection: &Collection,
    ids: &[LeafId],
) -> Result<(Vec<LeafId>, Vec<LeafId>), OutlineError> {
    for id in ids {
        if !is_valid_id(id) {
            return Err(OutlineError::InvalidId(id.clone()));
        }
        if collection.contains_leaf(id) {
            return Err(OutlineError::DuplicateLeaf(id.clone()));
        }
    }

    let mut next = playground.to_vec();
    let mut added = Vec::new();
    for id in ids {
        if !next.contains(id) {
            next.push(id.clone());
            added.push(id.clone());
        }
    }
    Ok((next, added))
}

/// Remove units from the playground. IDs that are not staged are ignored.
pub fn unstage_units(playground: &[LeafId], ids: &HashSet<LeafId>) -> Vec<LeafId> {
    playground
        .iter()
        .filter(|id| !ids.contains(*id))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Placing staged units
// ---------------------------------------------------------------------------

/// Result of dropping staged units into the outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub collection: Collection,
    pub playground: Vec<LeafId>,
    /// The playground selection after the drop
    pub selection: SelectionState,
    pub status: RelocationStatus,
}

impl Placement {
    pub fn is_applied(&self) -> bool {
        self.status == RelocationStatus::Applied
    }
}

/// Drop a group dragged out of the playground into an outline subsection.
///
/// The group lands before the hovered anchor, or at the end of the target
/// when there is no anchor or the anchor lives elsewhere. Placed units leave
/// the playground in the same step and the playground selection is cleared.
/// Dragged IDs that are not staged, or are already placed, are ignored.
pub fn apply_staged_drop(
    collection: &Collection,
    playground: &[LeafId],
    selection: &SelectionState,
    session: &DragSession,
    target: &DropTarget,
) -> Placement {
    let unchanged = |reason: NoOpReason| {
        tracing::debug!(%reason, target = %target.container_id, "staged drop skipped");
        Placement {
            collection: collection.clone(),
            playground: playground.to_vec(),
            selection: selection.clone(),
            status: RelocationStatus::Unchanged(reason),
        }
    };

    if session.kind != DragKind::Leaf {
        return unchanged(NoOpReason::NotALeafDrag);
    }
    if collection.subsection(&target.container_id).is_none() {
        return unchanged(NoOpReason::ContainerNotFound);
    }

    let mut seen = HashSet::new();
    let group: Vec<LeafId> = session
        .dragged_ids
        .iter()
        .filter(|id| playground.contains(*id) && !collection.contains_leaf(id))
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();
    if group.is_empty() {
        return unchanged(NoOpReason::NothingToMove);
    }

    let mut next = collection.clone();
    if let Some(sub) = next.subsection_mut(&target.container_id) {
        let insert_at = target
            .anchor_leaf_id
            .as_ref()
            .and_then(|a| sub.unit_ids.iter().position(|id| id == a))
            .unwrap_or(sub.unit_ids.len());
        splice_at(&mut sub.unit_ids, &group, insert_at);
    }

    let placed: HashSet<LeafId> = group.iter().cloned().collect();
    let mut selection = selection.clone();
    selection_ops::clear(&mut selection);
    tracing::debug!(placed = group.len(), target = %target.container_id, "staged units placed");

    Placement {
        collection: next,
        playground: unstage_units(playground, &placed),
        selection,
        status: RelocationStatus::Applied,
    }
}
