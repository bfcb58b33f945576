use std::fs;
use std::path::Path;

use crate::io::deck_io::DeckError;
use crate::model::config::{DeckConfig, ProjectConfig};

/// Read deck.toml, returning both the parsed config and the raw toml_edit
/// document for edits that keep the user's formatting.
pub fn read_config(deck_dir: &Path) -> Result<(DeckConfig, toml_edit::DocumentMut), DeckError> {
    let config_path = deck_dir.join("deck.toml");
    let config_text = fs::read_to_string(&config_path).map_err(|e| DeckError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: DeckConfig = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk.
pub fn write_config(deck_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), DeckError> {
    let config_path = deck_dir.join("deck.toml");
    crate::io::atomic::atomic_write(&config_path, doc.to_string().as_bytes()).map_err(|e| {
        DeckError::WriteError {
            path: config_path,
            source: e,
        }
    })
}

/// Set or clear `[deck] active`
pub fn set_active(doc: &mut toml_edit::DocumentMut, name: Option<&str>) {
    if !doc.contains_key("deck") {
        doc["deck"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    match name {
        Some(name) => doc["deck"]["active"] = toml_edit::value(name),
        None => {
            if let Some(table) = doc["deck"].as_table_like_mut() {
                table.remove("active");
            }
        }
    }
}

/// Append a `[[projects]]` entry
pub fn add_project_to_config(doc: &mut toml_edit::DocumentMut, project: &ProjectConfig) {
    if !doc.contains_key("projects") {
        doc["projects"] = toml_edit::Item::ArrayOfTables(toml_edit::ArrayOfTables::new());
    }

    if let Some(projects) = doc["projects"].as_array_of_tables_mut() {
        let mut table = toml_edit::Table::new();
        table["name"] = toml_edit::value(&project.name);
        table["file"] = toml_edit::value(&project.file);
        projects.push(table);
    }
}

/// Point an existing `[[projects]]` entry at a new name and file
pub fn rename_project_in_config(
    doc: &mut toml_edit::DocumentMut,
    old_name: &str,
    new_name: &str,
    new_file: &str,
) {
    if let Some(projects) = doc
        .get_mut("projects")
        .and_then(|p| p.as_array_of_tables_mut())
    {
        for table in projects.iter_mut() {
            if table.get("name").and_then(|v| v.as_str()) == Some(old_name) {
                table["name"] = toml_edit::value(new_name);
                table["file"] = toml_edit::value(new_file);
                break;
            }
        }
    }
}

/// Drop a `[[projects]]` entry
pub fn remove_project_from_config(doc: &mut toml_edit::DocumentMut, name: &str) {
    if let Some(projects) = doc
        .get_mut("projects")
        .and_then(|p| p.as_array_of_tables_mut())
    {
        projects.retain(|table| table.get("name").and_then(|v| v.as_str()) != Some(name));
    }
}
