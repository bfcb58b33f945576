use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::selection::SelectionState;

/// Persisted CLI state (written to deck/.state.json)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeckState {
    /// Selection per project name
    #[serde(default)]
    pub selections: IndexMap<String, SelectionState>,
    /// Playground selection per project name
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub playground_selections: IndexMap<String, SelectionState>,
}

/// Read .state.json; a missing or unreadable file is an empty state
pub fn read_state(deck_dir: &Path) -> DeckState {
    let path = deck_dir.join(".state.json");
    fs::read_to_string(&path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

/// Write .state.json
pub fn write_state(deck_dir: &Path, state: &DeckState) -> Result<(), std::io::Error> {
    let path = deck_dir.join(".state.json");
    let content = serde_json::to_string_pretty(state)?;
    crate::io::atomic::atomic_write(&path, content.as_bytes())
}

pub fn read_selection(deck_dir: &Path, project: &str) -> SelectionState {
    read_state(deck_dir)
        .selections
        .shift_remove(project)
        .unwrap_or_default()
}

pub fn read_playground_selection(deck_dir: &Path, project: &str) -> SelectionState {
    read_state(deck_dir)
        .playground_selections
        .shift_remove(project)
        .unwrap_or_default()
}

/// Store a project's selection. Empty selections are dropped from the file.
pub fn write_selection(
    deck_dir: &Path,
    project: &str,
    selection: &SelectionState,
) -> Result<(), std::io::Error> {
    let mut state = read_state(deck_dir);
    store(&mut state.selections, project, selection);
    write_state(deck_dir, &state)
}

pub fn write_playground_selection(
    deck_dir: &Path,
    project: &str,
    selection: &SelectionState,
) -> Result<(), std::io::Error> {
    let mut state = read_state(deck_dir);
    store(&mut state.playground_selections, project, selection);
    write_state(deck_dir, &state)
}

/// Store both of a project's selections with a single write.
pub fn write_selections(
    deck_dir: &Path,
    project: &str,
    outline: &SelectionState,
    playground: &SelectionState,
) -> Result<(), std::io::Error> {
    let mut state = read_state(deck_dir);
    store(&mut state.selections, project, outline);
    store(&mut state.playground_selections, project, playground);
    write_state(deck_dir, &state)
}

fn store(map: &mut IndexMap<String, SelectionState>, project: &str, selection: &SelectionState) {
    if selection.is_empty() && selection.anchor_index.is_none() {
        map.shift_remove(project);
    } else {
        map.insert(project.to_string(), selection.clone());
    }
}

/// Carry a project's selections over to its new name.
pub fn rename_selection(deck_dir: &Path, old: &str, new: &str) -> Result<(), std::io::Error> {
    let mut state = read_state(deck_dir);
    let mut changed = false;
    for map in [&mut state.selections, &mut state.playground_selections] {
        if let Some(selection) = map.shift_remove(old) {
            map.insert(new.to_string(), selection);
            changed = true;
        }
    }
    if changed {
        write_state(deck_dir, &state)?;
    }
    Ok(())
}

pub fn remove_selection(deck_dir: &Path, project: &str) -> Result<(), std::io::Error> {
    let mut state = read_state(deck_dir);
    let outline = state.selections.shift_remove(project).is_some();
    let playground = state.playground_selections.shift_remove(project).is_some();
    if outline || playground {
        write_state(deck_dir, &state)?;
    }
    Ok(())
}
