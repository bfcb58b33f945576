use std::fs;
use std::path::{Path, PathBuf};

use crate::io::{config_io, state};
use crate::model::deck::Deck;
use crate::model::project::ProjectFile;
use crate::ops::check;

/// Error type for deck I/O operations
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("not a deck workspace: no deck/ directory found")]
    NotADeck,
    #[error("deck already initialized at {0}")]
    AlreadyInitialized(PathBuf),
    #[error("no active project: create one with `nd project new <NAME>`")]
    NoActiveProject,
    #[error("active project {0:?} is not listed in deck.toml")]
    UnknownProject(String),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse deck.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit deck.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("could not parse {path}: {source}")]
    OutlineParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize outline: {0}")]
    OutlineSerializeError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

const DECK_TOML_TEMPLATE: &str = r#"[deck]
name = ""

# --- Projects ---
# Add projects with: nd project new <NAME>
#
# [[projects]]
# name = "main"
# file = "projects/main.json"

# --- Export ---
# Paths are relative to the directory containing deck/.
#
# [export]
# units_dir = "units"
# output_dir = "exports"
# header = "header.tex"      # must contain %%CONTENT%%

# --- Logging ---
# ND_LOG overrides this (e.g. ND_LOG=notedeck=debug).
#
# [log]
# level = "warn"
"#;

/// Find the deck workspace by walking up from `start`, looking for
/// `deck/deck.toml`.
pub fn discover_deck(start: &Path) -> Result<PathBuf, DeckError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join("deck").join("deck.toml").is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(DeckError::NotADeck);
        }
    }
}

/// Create `deck/deck.toml` and the projects directory under `root`.
pub fn init_deck(root: &Path, name: &str, force: bool) -> Result<PathBuf, DeckError> {
    let deck_dir = root.join("deck");
    let config_path = deck_dir.join("deck.toml");
    if config_path.exists() && !force {
        return Err(DeckError::AlreadyInitialized(deck_dir));
    }
    fs::create_dir_all(deck_dir.join("projects"))?;

    let mut doc: toml_edit::DocumentMut = DECK_TOML_TEMPLATE.parse()?;
    doc["deck"]["name"] = toml_edit::value(name);
    config_io::write_config(&deck_dir, &doc)?;
    Ok(deck_dir)
}

/// Load the deck rooted at `root`, with the active project's outline,
/// playground and stored selections. A deck without an active project loads
/// an empty outline.
pub fn load_deck(root: &Path) -> Result<Deck, DeckError> {
    let deck_dir = root.join("deck");
    if !deck_dir.is_dir() {
        return Err(DeckError::NotADeck);
    }
    let (config, _doc) = config_io::read_config(&deck_dir)?;

    let active = config.deck.active.clone();
    let (file, selection, staged) = match &active {
        Some(name) => {
            let project = config
                .project(name)
                .ok_or_else(|| DeckError::UnknownProject(name.clone()))?;
            (
                load_project_file(&deck_dir, &project.file)?,
                state::read_selection(&deck_dir, name),
                state::read_playground_selection(&deck_dir, name),
            )
        }
        None => Default::default(),
    };
    let ProjectFile {
        outline: collection,
        playground,
    } = file;

    let mut report = check::check_collection(&collection, &selection);
    check::check_playground(&playground, &collection, &mut report);
    if !report.valid {
        tracing::warn!(
            errors = report.errors.len(),
            "outline breaks invariants; run `nd check`"
        );
    }

    Ok(Deck {
        root: root.to_path_buf(),
        deck_dir,
        config,
        active,
        collection,
        selection,
        playground,
        staged,
    })
}

/// Read a project file. A missing file is an empty project.
pub fn load_project_file(deck_dir: &Path, file: &str) -> Result<ProjectFile, DeckError> {
    let path = deck_dir.join(file);
    if !path.exists() {
        return Ok(ProjectFile::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| DeckError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| DeckError::OutlineParseError { path, source: e })
}

/// Write a project file as pretty JSON.
pub fn save_project_file(deck_dir: &Path, file: &str, project: &ProjectFile) -> Result<(), DeckError> {
    let path = deck_dir.join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut content = serde_json::to_string_pretty(project)?;
    content.push('\n');
    crate::io::atomic::atomic_write(&path, content.as_bytes())
        .map_err(|e| DeckError::WriteError { path, source: e })
}

/// Persist the active project's outline, playground and selections.
pub fn save_deck(deck: &Deck) -> Result<(), DeckError> {
    let name = deck.active.as_deref().ok_or(DeckError::NoActiveProject)?;
    let project = deck
        .config
        .project(name)
        .ok_or_else(|| DeckError::UnknownProject(name.to_string()))?;
    save_project_file(&deck.deck_dir, &project.file, &deck.project_file())?;
    state::write_selections(&deck.deck_dir, name, &deck.selection, &deck.staged)
        .map_err(|e| DeckError::WriteError {
            path: deck.deck_dir.join(".state.json"),
            source: e,
        })?;
    tracing::debug!(
        project = name,
        leaves = deck.collection.count_leaves(),
        staged = deck.playground.len(),
        "deck saved"
    );
    Ok(())
}
