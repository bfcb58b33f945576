use chrono::{DateTime, Local};
use serde::Serialize;

use crate::model::gesture::{DecodedToken, DragKind};
use crate::model::outline::{Collection, LeafId};
use crate::model::selection::SelectionState;
use crate::ops::check::{CheckError, CheckResult, CheckWarning};
use crate::ops::relocate::{NoOpReason, RelocationStatus};
use crate::ops::search::{HitKind, SearchHit};
use crate::util::unicode::{pad_to_width, truncate_to_width};

/// Longest container name shown in the tree view, in terminal cells
const NAME_WIDTH: usize = 60;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ShowJson<'a> {
    pub project: Option<&'a str>,
    pub sections: &'a [crate::model::outline::Section],
    pub selected: Vec<&'a str>,
    pub playground: &'a [LeafId],
    pub playground_selected: Vec<&'a str>,
}

#[derive(Serialize)]
pub struct ProjectJson {
    pub name: String,
    pub file: String,
    pub active: bool,
    pub units: usize,
    pub staged: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Local>>,
}

#[derive(Serialize)]
pub struct MoveJson {
    pub kind: DragKind,
    pub dragged: Vec<String>,
    pub moved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<NoOpReason>,
}

impl MoveJson {
    pub fn from_status(kind: DragKind, dragged: Vec<String>, status: RelocationStatus) -> Self {
        let (moved, reason) = match status {
            RelocationStatus::Applied => (true, None),
            RelocationStatus::Unchanged(reason) => (false, Some(reason)),
        };
        MoveJson {
            kind,
            dragged,
            moved,
            reason,
        }
    }
}

#[derive(Serialize)]
pub struct TokenJson {
    pub token: String,
    #[serde(flatten)]
    pub decoded: DecodedToken,
}

#[derive(Serialize)]
pub struct SelectionJson<'a> {
    pub selected: Vec<&'a str>,
    pub anchor_index: Option<usize>,
}

#[derive(Serialize)]
pub struct CreatedJson {
    pub id: String,
}

#[derive(Serialize)]
pub struct ExportJson {
    pub path: String,
}

#[derive(Serialize)]
pub struct RenamedJson {
    pub id: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct AddedJson {
    pub container: String,
    pub added: Vec<String>,
}

#[derive(Serialize)]
pub struct RemovedJson {
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectChange {
    Created,
    Renamed,
    Deleted,
    Switched,
}

#[derive(Serialize)]
pub struct ProjectChangeJson {
    pub change: ProjectChange,
    pub project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    /// Active project once the change is written
    pub active: Option<String>,
}

#[derive(Serialize)]
pub struct PlaygroundJson<'a> {
    pub units: &'a [LeafId],
    pub selected: Vec<&'a str>,
    pub anchor_index: Option<usize>,
}

pub fn selection_to_json(selection: &SelectionState) -> SelectionJson<'_> {
    SelectionJson {
        selected: selection.selected.iter().map(String::as_str).collect(),
        anchor_index: selection.anchor_index,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format the outline as an indented tree. Selected units are starred.
pub fn format_outline(collection: &Collection, selection: &SelectionState) -> Vec<String> {
    let mut lines = Vec::new();
    for section in &collection.sections {
        lines.push(format!(
            "{} [{}]",
            truncate_to_width(&section.name, NAME_WIDTH),
            section.id
        ));
        for sub in &section.subsections {
            lines.push(format!(
                "  {} [{}]",
                truncate_to_width(&sub.name, NAME_WIDTH),
                sub.id
            ));
            for unit in &sub.unit_ids {
                let mark = if selection.contains(unit) { '*' } else { ' ' };
                lines.push(format!("   {} {}", mark, unit));
            }
        }
    }
    lines
}

/// Staged units in order, selected ones starred.
pub fn format_playground(playground: &[LeafId], selection: &SelectionState) -> Vec<String> {
    playground
        .iter()
        .map(|unit| {
            let mark = if selection.contains(unit) { '*' } else { ' ' };
            format!(" {} {}", mark, unit)
        })
        .collect()
}

pub fn format_check_error(error: &CheckError) -> String {
    match error {
        CheckError::DuplicateUnit {
            unit_id,
            subsection_ids,
        } => format!(
            "duplicate unit {} in {}",
            unit_id,
            subsection_ids.join(", ")
        ),
        CheckError::DuplicateSection { section_id } => {
            format!("duplicate section id {}", section_id)
        }
        CheckError::DuplicateSubsection { subsection_id } => {
            format!("duplicate subsection id {}", subsection_id)
        }
        CheckError::InvalidId { id } => format!("invalid id {:?}", id),
    }
}

pub fn format_check_warning(warning: &CheckWarning) -> String {
    match warning {
        CheckWarning::EmptySection { section_id } => format!("section {} is empty", section_id),
        CheckWarning::EmptySubsection { subsection_id } => {
            format!("subsection {} is empty", subsection_id)
        }
        CheckWarning::StaleSelection { unit_id } => {
            format!("selected unit {} is not in the outline", unit_id)
        }
        CheckWarning::MissingUnitFile { unit_id } => format!("no {}.tex for unit", unit_id),
        CheckWarning::StagedUnitPlaced { unit_id } => {
            format!("staged unit {} is already placed", unit_id)
        }
        CheckWarning::DuplicateStagedUnit { unit_id } => {
            format!("unit {} is staged more than once", unit_id)
        }
    }
}

pub fn format_check(result: &CheckResult) -> Vec<String> {
    let mut lines = Vec::new();
    for e in &result.errors {
        lines.push(format!("error: {}", format_check_error(e)));
    }
    for w in &result.warnings {
        lines.push(format!("warning: {}", format_check_warning(w)));
    }
    if result.valid {
        lines.push("\u{2713} outline is valid".to_string());
    } else {
        lines.push("\u{2717} outline has errors".to_string());
    }
    lines
}

fn hit_kind_label(kind: HitKind) -> &'static str {
    match kind {
        HitKind::Section => "section",
        HitKind::Subsection => "subsection",
        HitKind::Unit => "unit",
    }
}

/// One line per hit: kind, token, and where it lives. Columns are aligned.
pub fn format_search_hits(hits: &[SearchHit]) -> Vec<String> {
    let token_width = hits.iter().map(|h| h.token.len()).max().unwrap_or(0);
    hits.iter()
        .map(|h| {
            format!(
                "{}  {}  {}",
                pad_to_width(hit_kind_label(h.kind), 10),
                pad_to_width(&h.token, token_width),
                h.path.join(" > ")
            )
        })
        .collect()
}

pub fn format_project_line(project: &ProjectJson) -> String {
    let marker = if project.active { '*' } else { ' ' };
    let modified = project
        .modified
        .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let staged = match project.staged {
        0 => String::new(),
        n => format!(" (+{} staged)", n),
    };
    format!(
        "{} {}  {} units{}  {}",
        marker, project.name, project.units, staged, modified
    )
}

pub fn format_project_change(change: &ProjectChangeJson) -> Vec<String> {
    let mut lines = Vec::new();
    match change.change {
        ProjectChange::Created => {
            if change.active.as_deref() == Some(change.project.as_str()) {
                lines.push(format!("created project: {} (active)", change.project));
            } else {
                lines.push(format!("created project: {}", change.project));
            }
        }
        ProjectChange::Renamed => lines.push(format!(
            "renamed project: {} -> {}",
            change.previous.as_deref().unwrap_or("?"),
            change.project
        )),
        ProjectChange::Deleted => {
            lines.push(format!("deleted project: {}", change.project));
            if let Some(active) = &change.active {
                lines.push(format!("active project: {}", active));
            }
        }
        ProjectChange::Switched => lines.push(format!("active project: {}", change.project)),
    }
    lines
}

pub fn format_move(mv: &MoveJson) -> String {
    match (mv.moved, mv.reason) {
        (true, _) => format!("moved {} {}", mv.kind, mv.dragged.join(", ")),
        (false, Some(reason)) => format!("unchanged: {}", reason),
        (false, None) => "unchanged".to_string(),
    }
}
