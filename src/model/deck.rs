use std::path::PathBuf;

use super::config::DeckConfig;
use super::outline::{Collection, LeafId};
use super::project::ProjectFile;
use super::selection::SelectionState;

/// A loaded deck workspace with its active project
#[derive(Debug)]
pub struct Deck {
    /// Root directory of the workspace (parent of `deck/`)
    pub root: PathBuf,
    /// Path to the `deck/` directory
    pub deck_dir: PathBuf,
    /// Parsed deck.toml
    pub config: DeckConfig,
    /// Name of the active project, if one is configured
    pub active: Option<String>,
    /// Outline of the active project (empty when none)
    pub collection: Collection,
    /// Persisted selection for the active project
    pub selection: SelectionState,
    /// Units staged in the active project's playground
    pub playground: Vec<LeafId>,
    /// Selection over the playground, kept apart from the outline selection
    pub staged: SelectionState,
}

impl Deck {
    /// The project file contents as they would be saved
    pub fn project_file(&self) -> ProjectFile {
        ProjectFile::new(self.collection.clone(), self.playground.clone())
    }
}
