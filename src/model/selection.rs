use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::outline::LeafId;

/// Multi-select state over the flattened outline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    /// Currently selected unit IDs
    #[serde(default)]
    pub selected: BTreeSet<LeafId>,
    /// Position of the last plain (non-range) click in the flattened ordering
    #[serde(default)]
    pub anchor_index: Option<usize>,
}

impl SelectionState {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }
}
