use serde::{Deserialize, Serialize};

/// Opaque identifier of one content unit (a leaf of the outline)
pub type LeafId = String;

/// Opaque identifier of a section or a subsection
pub type ContainerId = String;

/// The innermost container: an ordered list of unit IDs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsection {
    pub id: ContainerId,
    pub name: String,
    /// Unit IDs in display order, no duplicates
    #[serde(rename = "unitIDs", default)]
    pub unit_ids: Vec<LeafId>,
}

impl Subsection {
    pub fn new(id: impl Into<ContainerId>, name: impl Into<String>) -> Self {
        Subsection {
            id: id.into(),
            name: name.into(),
            unit_ids: Vec::new(),
        }
    }
}

/// A top-level container holding subsections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: ContainerId,
    pub name: String,
    #[serde(default)]
    pub subsections: Vec<Subsection>,
}

impl Section {
    pub fn new(id: impl Into<ContainerId>, name: impl Into<String>) -> Self {
        Section {
            id: id.into(),
            name: name.into(),
            subsections: Vec::new(),
        }
    }
}

/// The outline root. Serializes as `{ "sections": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Where a leaf currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafLocation {
    pub section_index: usize,
    pub subsection_index: usize,
    pub item_index: usize,
}

impl Collection {
    pub fn new(sections: Vec<Section>) -> Self {
        Collection { sections }
    }

    /// Iterate over every subsection, in outline order
    pub fn subsections(&self) -> impl Iterator<Item = &Subsection> {
        self.sections.iter().flat_map(|s| s.subsections.iter())
    }

    pub fn subsections_mut(&mut self) -> impl Iterator<Item = &mut Subsection> {
        self.sections.iter_mut().flat_map(|s| s.subsections.iter_mut())
    }

    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    pub fn section_mut(&mut self, section_id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == section_id)
    }

    pub fn subsection(&self, subsection_id: &str) -> Option<&Subsection> {
        self.subsections().find(|s| s.id == subsection_id)
    }

    pub fn subsection_mut(&mut self, subsection_id: &str) -> Option<&mut Subsection> {
        self.subsections_mut().find(|s| s.id == subsection_id)
    }

    /// The section that owns the given subsection
    pub fn parent_of(&self, subsection_id: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.subsections.iter().any(|sub| sub.id == subsection_id))
    }

    /// Every unit ID in display order: sections, then subsections, then items.
    /// This is the positional reference for shift-range selection.
    pub fn flattened_leaf_ids(&self) -> Vec<LeafId> {
        self.subsections()
            .flat_map(|sub| sub.unit_ids.iter().cloned())
            .collect()
    }

    pub fn count_leaves(&self) -> usize {
        self.subsections().map(|sub| sub.unit_ids.len()).sum()
    }

    pub fn contains_leaf(&self, leaf_id: &str) -> bool {
        self.subsections()
            .any(|sub| sub.unit_ids.iter().any(|id| id == leaf_id))
    }

    /// Locate a leaf. Returns the first occurrence if the outline was
    /// hand-edited into holding duplicates.
    pub fn find_leaf(&self, leaf_id: &str) -> Option<LeafLocation> {
        for (section_index, section) in self.sections.iter().enumerate() {
            for (subsection_index, sub) in section.subsections.iter().enumerate() {
                if let Some(item_index) = sub.unit_ids.iter().position(|id| id == leaf_id) {
                    return Some(LeafLocation {
                        section_index,
                        subsection_index,
                        item_index,
                    });
                }
            }
        }
        None
    }

    /// ID of the subsection holding `leaf_id`
    pub fn holder_of(&self, leaf_id: &str) -> Option<&ContainerId> {
        self.find_leaf(leaf_id)
            .map(|loc| &self.sections[loc.section_index].subsections[loc.subsection_index].id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Collection {
        let mut intro = Section::new("sec-001", "Intro");
        let mut basics = Subsection::new("sub-001", "Basics");
        basics.unit_ids = vec!["DEF-1".into(), "THEO-2".into()];
        let mut more = Subsection::new("sub-002", "More");
        more.unit_ids = vec!["EXA-3".into()];
        intro.subsections = vec![basics, more];
        let mut outro = Section::new("sec-002", "Outro");
        outro.subsections = vec![Subsection::new("sub-003", "Empty")];
        Collection::new(vec![intro, outro])
    }

    #[test]
    fn test_serializes_to_unit_ids_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["sections"][0]["subsections"][0]["unitIDs"][1], "THEO-2");
        assert_eq!(json["sections"][1]["subsections"][0]["unitIDs"], serde_json::json!([]));
        assert!(json["sections"][0]["subsections"][0].get("unit_ids").is_none());
    }

    #[test]
    fn test_deserializes_external_shape() {
        let text = r#"{"sections":[{"id":"a","name":"A","subsections":[{"id":"b","name":"B","unitIDs":["u1","u2"]}]}]}"#;
        let collection: Collection = serde_json::from_str(text).unwrap();
        assert_eq!(collection.subsection("b").unwrap().unit_ids, vec!["u1", "u2"]);
        let back = serde_json::to_string(&collection).unwrap();
        assert_eq!(back, text);
    }

    #[test]
    fn test_flattened_order_and_count() {
        let c = sample();
        assert_eq!(c.flattened_leaf_ids(), vec!["DEF-1", "THEO-2", "EXA-3"]);
        assert_eq!(c.count_leaves(), 3);
    }

    #[test]
    fn test_find_leaf_and_parent() {
        let c = sample();
        let loc = c.find_leaf("EXA-3").unwrap();
        assert_eq!((loc.section_index, loc.subsection_index, loc.item_index), (0, 1, 0));
        assert_eq!(c.holder_of("THEO-2").map(String::as_str), Some("sub-001"));
        assert_eq!(c.parent_of("sub-003").unwrap().id, "sec-002");
        assert!(c.find_leaf("nope").is_none());
    }
}
