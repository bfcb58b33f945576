use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::outline::{Collection, LeafId};
use crate::model::selection::SelectionState;
use crate::ops::token::is_valid_id;

/// Structured result from `nd check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A validation error (the outline breaks an invariant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// A unit appears more than once across the outline
    #[serde(rename = "duplicate_unit")]
    DuplicateUnit {
        unit_id: String,
        subsection_ids: Vec<String>,
    },
    /// Two sections share an ID
    #[serde(rename = "duplicate_section")]
    DuplicateSection { section_id: String },
    /// Two subsections share an ID
    #[serde(rename = "duplicate_subsection")]
    DuplicateSubsection { subsection_id: String },
    /// An ID is empty or contains the token separator
    #[serde(rename = "invalid_id")]
    InvalidId { id: String },
}

/// A validation warning (non-critical issue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    #[serde(rename = "empty_section")]
    EmptySection { section_id: String },
    #[serde(rename = "empty_subsection")]
    EmptySubsection { subsection_id: String },
    /// A selected unit is no longer in the outline
    #[serde(rename = "stale_selection")]
    StaleSelection { unit_id: String },
    /// No `<unitID>.tex` exists for a unit
    #[serde(rename = "missing_unit_file")]
    MissingUnitFile { unit_id: String },
    /// A staged unit is also placed in the outline
    #[serde(rename = "staged_unit_placed")]
    StagedUnitPlaced { unit_id: String },
    /// A unit is staged more than once
    #[serde(rename = "duplicate_staged_unit")]
    DuplicateStagedUnit { unit_id: String },
}

/// Validate an outline (and the selection stored alongside it).
///
/// Read-only. Hand-edited project files are the only way to reach most of
/// these errors; the engine never produces them.
pub fn check_collection(collection: &Collection, selection: &SelectionState) -> CheckResult {
    let mut result = CheckResult::default();

    let mut sections: IndexMap<&str, usize> = IndexMap::new();
    let mut subsections: IndexMap<&str, usize> = IndexMap::new();
    let mut units: IndexMap<&str, Vec<String>> = IndexMap::new();

    for section in &collection.sections {
        *sections.entry(section.id.as_str()).or_default() += 1;
        check_id(&section.id, &mut result);
        if section.subsections.is_empty() {
            result.warnings.push(CheckWarning::EmptySection {
                section_id: section.id.clone(),
            });
        }
        for sub in &section.subsections {
            *subsections.entry(sub.id.as_str()).or_default() += 1;
            check_id(&sub.id, &mut result);
            if sub.unit_ids.is_empty() {
                result.warnings.push(CheckWarning::EmptySubsection {
                    subsection_id: sub.id.clone(),
                });
            }
            for unit in &sub.unit_ids {
                check_id(unit, &mut result);
                units.entry(unit.as_str()).or_default().push(sub.id.clone());
            }
        }
    }

    for (id, count) in &sections {
        if *count > 1 {
            result.errors.push(CheckError::DuplicateSection {
                section_id: id.to_string(),
            });
        }
    }
    for (id, count) in &subsections {
        if *count > 1 {
            result.errors.push(CheckError::DuplicateSubsection {
                subsection_id: id.to_string(),
            });
        }
    }
    for (id, holders) in units {
        if holders.len() > 1 {
            tracing::warn!(unit = id, count = holders.len(), "unit appears more than once");
            result.errors.push(CheckError::DuplicateUnit {
                unit_id: id.to_string(),
                subsection_ids: holders,
            });
        }
    }

    for id in &selection.selected {
        if !collection.contains_leaf(id) {
            result.warnings.push(CheckWarning::StaleSelection {
                unit_id: id.clone(),
            });
        }
    }

    result.valid = result.errors.is_empty();
    result
}

/// Validate the playground against the outline it stages units for.
/// Updates `result.valid`.
pub fn check_playground(playground: &[LeafId], collection: &Collection, result: &mut CheckResult) {
    let mut seen: IndexMap<&str, usize> = IndexMap::new();
    for id in playground {
        check_id(id, result);
        *seen.entry(id.as_str()).or_default() += 1;
    }
    for (id, count) in seen {
        if count > 1 {
            result.warnings.push(CheckWarning::DuplicateStagedUnit {
                unit_id: id.to_string(),
            });
        }
        if collection.contains_leaf(id) {
            result.warnings.push(CheckWarning::StagedUnitPlaced {
                unit_id: id.to_string(),
            });
        }
    }
    result.valid = result.errors.is_empty();
}

/// Add a warning for every unit without a `<unitID>.tex` in `units_dir`.
/// Skipped entirely when the directory does not exist.
pub fn check_unit_files(collection: &Collection, units_dir: &Path, result: &mut CheckResult) {
    if !units_dir.is_dir() {
        return;
    }
    // invalid IDs are already reported as errors
    for id in collection.flattened_leaf_ids().into_iter().filter(|id| is_valid_id(id)) {
        if !units_dir.join(format!("{}.tex", id)).exists() {
            result.warnings.push(CheckWarning::MissingUnitFile { unit_id: id });
        }
    }
}

fn check_id(id: &str, result: &mut CheckResult) {
    if !is_valid_id(id) {
        result.errors.push(CheckError::InvalidId { id: id.to_string() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::outline::{Section, Subsection};
    use tempfile::TempDir;

    fn sub(id: &str, units: &[&str]) -> Subsection {
        let mut s = Subsection::new(id, id);
        s.unit_ids = units.iter().map(|u| u.to_string()).collect();
        s
    }

    #[test]
    fn test_clean_outline_is_valid() {
        let mut sec = Section::new("sec-001", "A");
        sec.subsections = vec![sub("sub-001", &["u1", "u2"])];
        let result = check_collection(&Collection::new(vec![sec]), &SelectionState::default());
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_unit_across_subsections() {
        let mut sec = Section::new("sec-001", "A");
        sec.subsections = vec![sub("sub-001", &["u1"]), sub("sub-002", &["u1", "u2"])];
        let result = check_collection(&Collection::new(vec![sec]), &SelectionState::default());
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![CheckError::DuplicateUnit {
                unit_id: "u1".into(),
                subsection_ids: vec!["sub-001".into(), "sub-002".into()],
            }]
        );
    }

    #[test]
    fn test_duplicate_container_ids_and_bad_ids() {
        let mut a = Section::new("sec-001", "A");
        a.subsections = vec![sub("sub-001", &["x::y"])];
        let mut b = Section::new("sec-001", "B");
        b.subsections = vec![sub("sub-001", &["z"])];
        let result = check_collection(&Collection::new(vec![a, b]), &SelectionState::default());
        assert!(result.errors.contains(&CheckError::DuplicateSection {
            section_id: "sec-001".into()
        }));
        assert!(result.errors.contains(&CheckError::DuplicateSubsection {
            subsection_id: "sub-001".into()
        }));
        assert!(result.errors.contains(&CheckError::InvalidId { id: "x::y".into() }));
    }

    #[test]
    fn test_warnings() {
        let mut a = Section::new("sec-001", "A");
        a.subsections = vec![sub("sub-001", &[])];
        let b = Section::new("sec-002", "B");
        let mut selection = SelectionState::default();
        selection.selected.insert("gone".into());
        let result = check_collection(&Collection::new(vec![a, b]), &selection);
        assert!(result.valid);
        assert_eq!(
            result.warnings,
            vec![
                CheckWarning::EmptySubsection {
                    subsection_id: "sub-001".into()
                },
                CheckWarning::EmptySection {
                    section_id: "sec-002".into()
                },
                CheckWarning::StaleSelection {
                    unit_id: "gone".into()
                },
            ]
        );
    }

    #[test]
    fn test_missing_unit_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("u1.tex"), "x").unwrap();
        let mut sec = Section::new("sec-001", "A");
        sec.subsections = vec![sub("sub-001", &["u1", "u2"])];
        let collection = Collection::new(vec![sec]);

        let mut result = check_collection(&collection, &SelectionState::default());
        check_unit_files(&collection, tmp.path(), &mut result);
        assert_eq!(
            result.warnings,
            vec![CheckWarning::MissingUnitFile {
                unit_id: "u2".into()
            }]
        );

        let mut result = check_collection(&collection, &SelectionState::default());
        check_unit_files(&collection, &tmp.path().join("nope"), &mut result);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_path_like_unit_ids_are_errors_not_file_lookups() {
        let tmp = TempDir::new().unwrap();
        let mut sec = Section::new("sec-001", "A");
        sec.subsections = vec![sub("sub-001", &["../u1"])];
        let collection = Collection::new(vec![sec]);

        let mut result = check_collection(&collection, &SelectionState::default());
        check_unit_files(&collection, tmp.path(), &mut result);
        assert!(!result.valid);
        assert_eq!(result.errors, vec![CheckError::InvalidId { id: "../u1".into() }]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_playground_warnings() {
        let mut sec = Section::new("sec-001", "A");
        sec.subsections = vec![sub("sub-001", &["u1"])];
        let collection = Collection::new(vec![sec]);
        let playground: Vec<LeafId> = ["n1", "u1", "n1"].iter().map(|s| s.to_string()).collect();

        let mut result = check_collection(&collection, &SelectionState::default());
        check_playground(&playground, &collection, &mut result);
        assert!(result.valid);
        assert_eq!(
            result.warnings,
            vec![
                CheckWarning::DuplicateStagedUnit {
                    unit_id: "n1".into()
                },
                CheckWarning::StagedUnitPlaced {
                    unit_id: "u1".into()
                },
            ]
        );

        check_playground(&["a::b".to_string()], &collection, &mut result);
        assert!(!result.valid);
    }

    #[test]
    fn test_json_shape() {
        let err = CheckError::DuplicateSection {
            section_id: "s".into(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "duplicate_section");
        assert_eq!(json["section_id"], "s");
    }
}
