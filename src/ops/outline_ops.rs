use std::collections::HashSet;

use crate::model::outline::{Collection, ContainerId, LeafId, Section, Subsection};
use crate::ops::token::is_valid_id;

/// Error type for outline operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutlineError {
    #[error("subsection not found: {0}")]
    ContainerNotFound(String),
    #[error("section not found: {0}")]
    SectionNotFound(String),
    #[error("unit already in outline: {0}")]
    DuplicateLeaf(String),
    #[error("unit not in outline: {0}")]
    LeafNotFound(String),
    #[error("unit not in playground: {0}")]
    NotStaged(String),
    #[error("invalid id: {0:?}")]
    InvalidId(String),
}

// ---------------------------------------------------------------------------
// Leaf membership
// ---------------------------------------------------------------------------

/// Remove every occurrence of the given IDs. IDs that are not present are
/// ignored; untouched items keep their order.
pub fn remove_leaves(collection: &Collection, ids: &HashSet<LeafId>) -> Collection {
    let mut next = collection.clone();
    for sub in next.subsections_mut() {
        sub.unit_ids.retain(|id| !ids.contains(id));
    }
    next
}

/// Insert `ids` (in order) into subsection `container_id` starting at
/// `at_index`, clamped to the list length.
pub fn insert_leaves(
    collection: &Collection,
    container_id: &str,
    ids: &[LeafId],
    at_index: usize,
) -> Result<Collection, OutlineError> {
    if collection.subsection(container_id).is_none() {
        return Err(OutlineError::ContainerNotFound(container_id.to_string()));
    }
    let mut seen = HashSet::new();
    for id in ids {
        if !is_valid_id(id) {
            return Err(OutlineError::InvalidId(id.clone()));
        }
        if !seen.insert(id.as_str()) || collection.contains_leaf(id) {
            return Err(OutlineError::DuplicateLeaf(id.clone()));
        }
    }

    let mut next = collection.clone();
    let sub = next
        .subsection_mut(container_id)
        .ok_or_else(|| OutlineError::ContainerNotFound(container_id.to_string()))?;
    splice_at(&mut sub.unit_ids, ids, at_index);
    Ok(next)
}

// ---------------------------------------------------------------------------
// Sibling order
// ---------------------------------------------------------------------------

/// Move the section at `from_index` to `to_index`.
pub fn reorder_sections(collection: &Collection, from_index: usize, to_index: usize) -> Collection {
    let mut next = collection.clone();
    array_move(&mut next.sections, from_index, to_index);
    next
}

/// Move a subsection of `parent_section_id` from `from_index` to `to_index`.
/// Unknown parents leave the outline unchanged.
pub fn reorder_subsections(
    collection: &Collection,
    parent_section_id: &str,
    from_index: usize,
    to_index: usize,
) -> Collection {
    let mut next = collection.clone();
    if let Some(section) = next.section_mut(parent_section_id) {
        array_move(&mut section.subsections, from_index, to_index);
    }
    next
}

/// Single-element list move. Returns false (and leaves `items` alone) when
/// the indices are equal or `from` is out of range; `to` is clamped.
pub(crate) fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() {
        return false;
    }
    let to = to.min(items.len() - 1);
    if from == to {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Insert `ids` into `items` at `index`, clamped to the list length.
pub(crate) fn splice_at(items: &mut Vec<LeafId>, ids: &[LeafId], index: usize) {
    let index = index.min(items.len());
    items.splice(index..index, ids.iter().cloned());
}

// ---------------------------------------------------------------------------
// Container lifecycle
// ---------------------------------------------------------------------------

/// Append a new section. Returns the new outline and the generated ID.
pub fn add_section(collection: &Collection, name: &str) -> (Collection, ContainerId) {
    let id = next_container_id(
        collection.sections.iter().map(|s| s.id.as_str()),
        "sec",
    );
    let mut next = collection.clone();
    next.sections.push(Section::new(id.clone(), name.trim()));
    (next, id)
}

/// Append a new subsection to `section_id`.
pub fn add_subsection(
    collection: &Collection,
    section_id: &str,
    name: &str,
) -> Result<(Collection, ContainerId), OutlineError> {
    let id = next_container_id(collection.subsections().map(|s| s.id.as_str()), "sub");
    let mut next = collection.clone();
    let section = next
        .section_mut(section_id)
        .ok_or_else(|| OutlineError::SectionNotFound(section_id.to_string()))?;
    section.subsections.push(Subsection::new(id.clone(), name.trim()));
    Ok((next, id))
}

/// Change a section's display name. The ID never changes.
pub fn rename_section(
    collection: &Collection,
    section_id: &str,
    name: &str,
) -> Result<Collection, OutlineError> {
    let mut next = collection.clone();
    let section = next
        .section_mut(section_id)
        .ok_or_else(|| OutlineError::SectionNotFound(section_id.to_string()))?;
    section.name = name.trim().to_string();
    Ok(next)
}

pub fn rename_subsection(
    collection: &Collection,
    subsection_id: &str,
    name: &str,
) -> Result<Collection, OutlineError> {
    let mut next = collection.clone();
    let sub = next
        .subsection_mut(subsection_id)
        .ok_or_else(|| OutlineError::ContainerNotFound(subsection_id.to_string()))?;
    sub.name = name.trim().to_string();
    Ok(next)
}

/// Delete a section together with its subsections and units.
pub fn remove_section(collection: &Collection, section_id: &str) -> Result<Collection, OutlineError> {
    let idx = collection
        .sections
        .iter()
        .position(|s| s.id == section_id)
        .ok_or_else(|| OutlineError::SectionNotFound(section_id.to_string()))?;
    let mut next = collection.clone();
    next.sections.remove(idx);
    Ok(next)
}

/// Delete a subsection together with its units.
pub fn remove_subsection(
    collection: &Collection,
    subsection_id: &str,
) -> Result<Collection, OutlineError> {
    let mut next = collection.clone();
    for section in &mut next.sections {
        if let Some(idx) = section.subsections.iter().position(|s| s.id == subsection_id) {
            section.subsections.remove(idx);
            return Ok(next);
        }
    }
    Err(OutlineError::ContainerNotFound(subsection_id.to_string()))
}

/// Next free `<prefix>-NNN` ID among `existing`.
fn next_container_id<'a>(existing: impl Iterator<Item = &'a str>, prefix: &str) -> ContainerId {
    let prefix_dash = format!("{}-", prefix);
    let max = existing
        .filter_map(|id| id.strip_prefix(&prefix_dash))
        .filter_map(|n| n.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    format!("{}{:03}", prefix_dash, max + 1)
}
