use crate::model::gesture::ContainerKind;
use crate::model::outline::Collection;
use crate::ops::outline_ops::array_move;

/// Move `dragged_id` into the slot held by `target_id` among its siblings.
///
/// Sections move among sections; subsections move only within their own
/// section. Anything else (unknown IDs, a target under another parent,
/// dropping onto itself) returns the outline unchanged.
pub fn apply_container_reorder(
    collection: &Collection,
    dragged_id: &str,
    target_id: &str,
    kind: ContainerKind,
) -> Collection {
    let mut next = collection.clone();
    let moved = match kind {
        ContainerKind::Section => {
            let from = position(next.sections.iter().map(|s| s.id.as_str()), dragged_id);
            let to = position(next.sections.iter().map(|s| s.id.as_str()), target_id);
            match (from, to) {
                (Some(from), Some(to)) => array_move(&mut next.sections, from, to),
                _ => false,
            }
        }
        ContainerKind::Subsection => {
            let parent = next
                .sections
                .iter_mut()
                .find(|s| s.subsections.iter().any(|sub| sub.id == dragged_id));
            match parent {
                Some(section) => {
                    let from = position(section.subsections.iter().map(|s| s.id.as_str()), dragged_id);
                    let to = position(section.subsections.iter().map(|s| s.id.as_str()), target_id);
                    match (from, to) {
                        (Some(from), Some(to)) => array_move(&mut section.subsections, from, to),
                        _ => false,
                    }
                }
                None => false,
            }
        }
    };

    if moved {
        tracing::debug!(%kind, dragged = dragged_id, target = target_id, "container reordered");
    } else {
        tracing::debug!(%kind, dragged = dragged_id, target = target_id, "container reorder skipped");
    }
    next
}

fn position<'a>(mut ids: impl Iterator<Item = &'a str>, id: &str) -> Option<usize> {
    ids.position(|candidate| candidate == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::outline::{Section, Subsection};

    fn sample() -> Collection {
        let mut a = Section::new("A", "A");
        a.subsections = vec![
            Subsection::new("a1", "a1"),
            Subsection::new("a2", "a2"),
            Subsection::new("a3", "a3"),
        ];
        let mut b = Section::new("B", "B");
        b.subsections = vec![Subsection::new("b1", "b1")];
        let c = Section::new("C", "C");
        Collection::new(vec![a, b, c])
    }

    fn section_ids(c: &Collection) -> Vec<&str> {
        c.sections.iter().map(|s| s.id.as_str()).collect()
    }

    fn sub_ids<'a>(c: &'a Collection, section: &str) -> Vec<&'a str> {
        c.section(section)
            .unwrap()
            .subsections
            .iter()
            .map(|s| s.id.as_str())
            .collect()
    }

    #[test]
    fn test_section_moves_down_into_target_slot() {
        let c = apply_container_reorder(&sample(), "A", "C", ContainerKind::Section);
        assert_eq!(section_ids(&c), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_section_moves_up_into_target_slot() {
        let c = apply_container_reorder(&sample(), "C", "A", ContainerKind::Section);
        assert_eq!(section_ids(&c), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_subsection_reorders_within_parent() {
        let c = apply_container_reorder(&sample(), "a3", "a1", ContainerKind::Subsection);
        assert_eq!(sub_ids(&c, "A"), vec!["a3", "a1", "a2"]);
    }

    #[test]
    fn test_subsection_cannot_cross_sections() {
        let original = sample();
        let c = apply_container_reorder(&original, "a1", "b1", ContainerKind::Subsection);
        assert_eq!(c, original);
    }

    #[test]
    fn test_unknown_ids_and_self_are_noops() {
        let original = sample();
        assert_eq!(apply_container_reorder(&original, "Z", "A", ContainerKind::Section), original);
        assert_eq!(apply_container_reorder(&original, "A", "Z", ContainerKind::Section), original);
        assert_eq!(apply_container_reorder(&original, "B", "B", ContainerKind::Section), original);
        // a section id is not a subsection
        assert_eq!(apply_container_reorder(&original, "A", "B", ContainerKind::Subsection), original);
    }

    #[test]
    fn test_units_travel_with_their_subsection() {
        let mut original = sample();
        original.sections[0].subsections[0].unit_ids = vec!["u1".into()];
        let c = apply_container_reorder(&original, "a1", "a2", ContainerKind::Subsection);
        assert_eq!(sub_ids(&c, "A"), vec!["a2", "a1", "a3"]);
        assert_eq!(c.subsection("a1").unwrap().unit_ids, vec!["u1"]);
    }
}
