use serde::{Deserialize, Serialize};

use super::outline::{Collection, LeafId};

/// Contents of one `projects/<name>.json` file.
///
/// The outline fields sit at the top level next to `playground`, so a file
/// written before staging existed still loads with an empty playground.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    #[serde(flatten)]
    pub outline: Collection,
    /// Units picked for the project but not yet placed, in staging order
    #[serde(default)]
    pub playground: Vec<LeafId>,
}

impl ProjectFile {
    pub fn new(outline: Collection, playground: Vec<LeafId>) -> Self {
        ProjectFile {
            outline,
            playground,
        }
    }

    /// Whether `leaf_id` is waiting in the playground
    pub fn is_staged(&self, leaf_id: &str) -> bool {
        self.playground.iter().any(|id| id == leaf_id)
    }
}
