use std::collections::BTreeSet;

use crate::model::gesture::DragSession;
use crate::model::outline::{Collection, LeafId};
use crate::model::selection::SelectionState;

/// Click on `id` at position `index` of `ordered_ids`.
///
/// A range click (with an anchor present) adds every ID between the anchor
/// and `index`, inclusive, keeping everything already selected; the anchor
/// stays put. A plain click flips membership of `id` and moves the anchor.
pub fn toggle_selection(
    selection: &SelectionState,
    id: &str,
    index: usize,
    extend_range: bool,
    ordered_ids: &[LeafId],
) -> SelectionState {
    let mut next = selection.clone();
    match (extend_range, selection.anchor_index) {
        (true, Some(anchor)) => {
            let (start, end) = if index <= anchor {
                (index, anchor)
            } else {
                (anchor, index)
            };
            let end = end.min(ordered_ids.len().saturating_sub(1));
            if let Some(range) = ordered_ids.get(start..=end) {
                next.selected.extend(range.iter().cloned());
            }
        }
        _ => {
            if !next.selected.remove(id) {
                next.selected.insert(id.to_string());
            }
            next.anchor_index = Some(index);
        }
    }
    next
}

/// Empty the selection and forget the anchor (after a drop, or on Escape).
pub fn clear(selection: &mut SelectionState) {
    selection.selected.clear();
    selection.anchor_index = None;
}

/// The set a drag of `primary_id` moves: the whole selection when the
/// primary item is part of a multi-item selection, otherwise just the
/// primary item.
pub fn effective_drag_set(selection: &SelectionState, primary_id: &str) -> BTreeSet<LeafId> {
    if selection.contains(primary_id) && selection.len() > 1 {
        selection.selected.clone()
    } else {
        BTreeSet::from([primary_id.to_string()])
    }
}

/// Drop selected IDs that are no longer in the outline. An anchor pointing
/// past the end of the flattened ordering is reset.
pub fn prune(selection: &mut SelectionState, collection: &Collection) {
    prune_to(selection, &collection.flattened_leaf_ids());
}

/// Same as [`prune`], against any ordering (e.g. the playground list).
pub fn prune_to(selection: &mut SelectionState, ordered_ids: &[LeafId]) {
    selection.selected.retain(|id| ordered_ids.contains(id));
    if selection.anchor_index.is_some_and(|a| a >= ordered_ids.len()) {
        selection.anchor_index = None;
    }
}

impl DragSession {
    /// Build the leaf drag for `primary_id`, ordering the group by outline
    /// position. Selected IDs missing from the outline keep their set order
    /// after the resident ones.
    pub fn from_selection(
        collection: &Collection,
        selection: &SelectionState,
        primary_id: &str,
    ) -> Self {
        Self::in_order(&collection.flattened_leaf_ids(), selection, primary_id)
    }

    /// Build a drag out of the playground, ordered by staging position.
    pub fn from_playground(
        playground: &[LeafId],
        selection: &SelectionState,
        primary_id: &str,
    ) -> Self {
        Self::in_order(playground, selection, primary_id)
    }

    fn in_order(ordered_ids: &[LeafId], selection: &SelectionState, primary_id: &str) -> Self {
        let set = effective_drag_set(selection, primary_id);
        let mut ordered: Vec<LeafId> = ordered_ids
            .iter()
            .filter(|id| set.contains(*id))
            .cloned()
            .collect();
        for id in &set {
            if !ordered.contains(id) {
                ordered.push(id.clone());
            }
        }
        DragSession::leaves(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::outline::{Section, Subsection};

    fn ids(list: &[&str]) -> Vec<LeafId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn selected(sel: &SelectionState) -> Vec<&str> {
        sel.selected.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_plain_toggle_flips_and_sets_anchor() {
        let order = ids(&["a", "b", "c"]);
        let s = toggle_selection(&SelectionState::default(), "b", 1, false, &order);
        assert_eq!(selected(&s), vec!["b"]);
        assert_eq!(s.anchor_index, Some(1));

        let s = toggle_selection(&s, "b", 1, false, &order);
        assert!(s.is_empty());
        assert_eq!(s.anchor_index, Some(1));
    }

    #[test]
    fn test_range_extends_without_removing() {
        let order = ids(&["a", "b", "c", "d", "e"]);
        let s = toggle_selection(&SelectionState::default(), "e", 4, false, &order);
        let s = toggle_selection(&s, "b", 1, false, &order);
        let s = toggle_selection(&s, "d", 3, true, &order);
        assert_eq!(selected(&s), vec!["b", "c", "d", "e"]);
        // anchor is not moved by a range click
        assert_eq!(s.anchor_index, Some(1));
    }

    #[test]
    fn test_range_upwards() {
        let order = ids(&["a", "b", "c", "d"]);
        let s = toggle_selection(&SelectionState::default(), "d", 3, false, &order);
        let s = toggle_selection(&s, "b", 1, true, &order);
        assert_eq!(selected(&s), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_range_without_anchor_is_plain_toggle() {
        let order = ids(&["a", "b"]);
        let s = toggle_selection(&SelectionState::default(), "b", 1, true, &order);
        assert_eq!(selected(&s), vec!["b"]);
        assert_eq!(s.anchor_index, Some(1));
    }

    #[test]
    fn test_range_clamps_to_ordering() {
        let order = ids(&["a", "b"]);
        let base = SelectionState {
            anchor_index: Some(0),
            ..Default::default()
        };
        let s = toggle_selection(&base, "z", 9, true, &order);
        assert_eq!(selected(&s), vec!["a", "b"]);
    }

    #[test]
    fn test_clear() {
        let order = ids(&["a"]);
        let mut s = toggle_selection(&SelectionState::default(), "a", 0, false, &order);
        clear(&mut s);
        assert_eq!(s, SelectionState::default());
    }

    #[test]
    fn test_effective_drag_set() {
        let mut s = SelectionState::default();
        s.selected.extend(ids(&["u1", "u3"]));
        assert_eq!(effective_drag_set(&s, "u1").len(), 2);
        // unselected primary overrides the stale selection
        assert_eq!(effective_drag_set(&s, "u2"), BTreeSet::from(["u2".to_string()]));

        s.selected.remove("u3");
        assert_eq!(effective_drag_set(&s, "u1"), BTreeSet::from(["u1".to_string()]));
    }

    #[test]
    fn test_prune_removes_absent_ids() {
        let mut sub = Subsection::new("s1", "S1");
        sub.unit_ids = ids(&["u1", "u2"]);
        let mut sec = Section::new("sec", "Sec");
        sec.subsections.push(sub);
        let collection = Collection::new(vec![sec]);

        let mut s = SelectionState::default();
        s.selected.extend(ids(&["u1", "gone"]));
        s.anchor_index = Some(5);
        prune(&mut s, &collection);
        assert_eq!(selected(&s), vec!["u1"]);
        assert_eq!(s.anchor_index, None);
    }

    #[test]
    fn test_drag_session_orders_by_outline() {
        let mut a = Subsection::new("a", "A");
        a.unit_ids = ids(&["x", "y"]);
        let mut b = Subsection::new("b", "B");
        b.unit_ids = ids(&["w", "v"]);
        let mut sec = Section::new("sec", "Sec");
        sec.subsections = vec![a, b];
        let collection = Collection::new(vec![sec]);

        let mut s = SelectionState::default();
        s.selected.extend(ids(&["v", "x", "w"]));
        let drag = DragSession::from_selection(&collection, &s, "w");
        assert_eq!(drag.dragged_ids, ids(&["x", "w", "v"]));

        let drag = DragSession::from_selection(&collection, &s, "y");
        assert_eq!(drag.dragged_ids, ids(&["y"]));
    }

    #[test]
    fn test_playground_drag_and_prune() {
        let playground = ids(&["n1", "n2", "n3"]);
        let order = playground.clone();
        let s = toggle_selection(&SelectionState::default(), "n3", 2, false, &order);
        let s = toggle_selection(&s, "n1", 0, false, &order);

        let drag = DragSession::from_playground(&playground, &s, "n3");
        assert_eq!(drag.dragged_ids, ids(&["n1", "n3"]));

        let mut s = s;
        prune_to(&mut s, &ids(&["n1"]));
        assert_eq!(selected(&s), vec!["n1"]);
        assert_eq!(s.anchor_index, Some(0));
    }
}
