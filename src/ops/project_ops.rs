use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::io::config_io;
use crate::io::deck_io::{self, DeckError};
use crate::model::config::{DeckConfig, ProjectConfig};
use crate::model::project::ProjectFile;

/// Error type for project management
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("project not found: {0}")]
    NotFound(String),
    #[error("project already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid project name {0:?}: use letters, digits, '-' and '_'")]
    InvalidName(String),
    #[error("deck error: {0}")]
    DeckError(#[from] DeckError),
}

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("valid regex"));

/// Project names double as file stems, so they stay filesystem-safe.
pub fn is_valid_project_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

fn project_file(name: &str) -> String {
    format!("projects/{}.json", name)
}

/// Create an empty project file and register it. The first project becomes
/// the active one.
pub fn new_project(
    deck_dir: &Path,
    doc: &mut toml_edit::DocumentMut,
    config: &mut DeckConfig,
    name: &str,
) -> Result<(), ProjectError> {
    if !is_valid_project_name(name) {
        return Err(ProjectError::InvalidName(name.to_string()));
    }
    if config.project(name).is_some() {
        return Err(ProjectError::AlreadyExists(name.to_string()));
    }

    let project = ProjectConfig {
        name: name.to_string(),
        file: project_file(name),
    };
    deck_io::save_project_file(deck_dir, &project.file, &ProjectFile::default())?;

    config_io::add_project_to_config(doc, &project);
    config.projects.push(project);
    if config.deck.active.is_none() {
        switch_project(doc, config, name)?;
    }
    Ok(())
}

/// Rename a project and its file. The active marker follows the rename.
pub fn rename_project(
    deck_dir: &Path,
    doc: &mut toml_edit::DocumentMut,
    config: &mut DeckConfig,
    old_name: &str,
    new_name: &str,
) -> Result<(), ProjectError> {
    if !is_valid_project_name(new_name) {
        return Err(ProjectError::InvalidName(new_name.to_string()));
    }
    if old_name != new_name && config.project(new_name).is_some() {
        return Err(ProjectError::AlreadyExists(new_name.to_string()));
    }
    let entry = config
        .projects
        .iter_mut()
        .find(|p| p.name == old_name)
        .ok_or_else(|| ProjectError::NotFound(old_name.to_string()))?;
    if old_name == new_name {
        return Ok(());
    }

    let new_file = project_file(new_name);
    let old_path = deck_dir.join(&entry.file);
    if old_path.exists() {
        fs::rename(&old_path, deck_dir.join(&new_file)).map_err(DeckError::IoError)?;
    }
    entry.name = new_name.to_string();
    entry.file = new_file.clone();
    config_io::rename_project_in_config(doc, old_name, new_name, &new_file);

    if config.deck.active.as_deref() == Some(old_name) {
        config.deck.active = Some(new_name.to_string());
        config_io::set_active(doc, Some(new_name));
    }
    Ok(())
}

/// Unregister a project and delete its file. If it was active, the first
/// remaining project (if any) becomes active.
pub fn delete_project(
    deck_dir: &Path,
    doc: &mut toml_edit::DocumentMut,
    config: &mut DeckConfig,
    name: &str,
) -> Result<(), ProjectError> {
    let idx = config
        .projects
        .iter()
        .position(|p| p.name == name)
        .ok_or_else(|| ProjectError::NotFound(name.to_string()))?;
    let project = config.projects.remove(idx);

    let path = deck_dir.join(&project.file);
    if path.exists() {
        fs::remove_file(&path).map_err(DeckError::IoError)?;
    }
    config_io::remove_project_from_config(doc, name);

    if config.deck.active.as_deref() == Some(name) {
        let next = config.projects.first().map(|p| p.name.clone());
        config_io::set_active(doc, next.as_deref());
        config.deck.active = next;
    }
    Ok(())
}

/// Make `name` the project commands operate on.
pub fn switch_project(
    doc: &mut toml_edit::DocumentMut,
    config: &mut DeckConfig,
    name: &str,
) -> Result<(), ProjectError> {
    if config.project(name).is_none() {
        return Err(ProjectError::NotFound(name.to_string()));
    }
    config.deck.active = Some(name.to_string());
    config_io::set_active(doc, Some(name));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, std::path::PathBuf, DeckConfig, toml_edit::DocumentMut) {
        let tmp = TempDir::new().unwrap();
        let deck_dir = tmp.path().join("deck");
        fs::create_dir_all(&deck_dir).unwrap();
        let text = "[deck]\nname = \"test\"\n";
        fs::write(deck_dir.join("deck.toml"), text).unwrap();
        let config: DeckConfig = toml::from_str(text).unwrap();
        let doc: toml_edit::DocumentMut = text.parse().unwrap();
        (tmp, deck_dir, config, doc)
    }

    fn reparse(doc: &toml_edit::DocumentMut) -> DeckConfig {
        toml::from_str(&doc.to_string()).unwrap()
    }

    #[test]
    fn test_new_project_becomes_active() {
        let (_tmp, deck_dir, mut config, mut doc) = setup();
        new_project(&deck_dir, &mut doc, &mut config, "eft").unwrap();
        new_project(&deck_dir, &mut doc, &mut config, "qft").unwrap();

        assert!(deck_dir.join("projects/eft.json").exists());
        assert_eq!(config.deck.active.as_deref(), Some("eft"));
        let written = reparse(&doc);
        assert_eq!(written.projects.len(), 2);
        assert_eq!(written.deck.active.as_deref(), Some("eft"));
    }

    #[test]
    fn test_new_project_rejects_duplicates_and_bad_names() {
        let (_tmp, deck_dir, mut config, mut doc) = setup();
        new_project(&deck_dir, &mut doc, &mut config, "eft").unwrap();
        assert!(matches!(
            new_project(&deck_dir, &mut doc, &mut config, "eft"),
            Err(ProjectError::AlreadyExists(_))
        ));
        assert!(matches!(
            new_project(&deck_dir, &mut doc, &mut config, "../up"),
            Err(ProjectError::InvalidName(_))
        ));
    }

    #[test]
    fn test_rename_moves_file_and_active() {
        let (_tmp, deck_dir, mut config, mut doc) = setup();
        new_project(&deck_dir, &mut doc, &mut config, "eft").unwrap();
        rename_project(&deck_dir, &mut doc, &mut config, "eft", "eft2").unwrap();

        assert!(!deck_dir.join("projects/eft.json").exists());
        assert!(deck_dir.join("projects/eft2.json").exists());
        let written = reparse(&doc);
        assert_eq!(written.deck.active.as_deref(), Some("eft2"));
        assert_eq!(written.projects[0].file, "projects/eft2.json");
    }

    #[test]
    fn test_rename_conflicts() {
        let (_tmp, deck_dir, mut config, mut doc) = setup();
        new_project(&deck_dir, &mut doc, &mut config, "a").unwrap();
        new_project(&deck_dir, &mut doc, &mut config, "b").unwrap();
        assert!(matches!(
            rename_project(&deck_dir, &mut doc, &mut config, "a", "b"),
            Err(ProjectError::AlreadyExists(_))
        ));
        assert!(matches!(
            rename_project(&deck_dir, &mut doc, &mut config, "zz", "c"),
            Err(ProjectError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_active_switches_to_next() {
        let (_tmp, deck_dir, mut config, mut doc) = setup();
        new_project(&deck_dir, &mut doc, &mut config, "a").unwrap();
        new_project(&deck_dir, &mut doc, &mut config, "b").unwrap();
        delete_project(&deck_dir, &mut doc, &mut config, "a").unwrap();

        assert!(!deck_dir.join("projects/a.json").exists());
        assert_eq!(config.deck.active.as_deref(), Some("b"));
        let written = reparse(&doc);
        assert_eq!(written.projects.len(), 1);
        assert_eq!(written.deck.active.as_deref(), Some("b"));

        delete_project(&deck_dir, &mut doc, &mut config, "b").unwrap();
        assert_eq!(config.deck.active, None);
        assert_eq!(reparse(&doc).deck.active, None);
    }

    #[test]
    fn test_switch_project() {
        let (_tmp, deck_dir, mut config, mut doc) = setup();
        new_project(&deck_dir, &mut doc, &mut config, "a").unwrap();
        new_project(&deck_dir, &mut doc, &mut config, "b").unwrap();
        switch_project(&mut doc, &mut config, "b").unwrap();
        assert_eq!(reparse(&doc).deck.active.as_deref(), Some("b"));
        assert!(switch_project(&mut doc, &mut config, "c").is_err());
    }
}
