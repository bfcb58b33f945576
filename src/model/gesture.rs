use serde::{Deserialize, Serialize};

use super::outline::{ContainerId, LeafId};

/// What kind of entity a drag gesture picked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragKind {
    Leaf,
    Section,
    Subsection,
}

/// The container kinds that can be reordered among their siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Section,
    Subsection,
}

impl DragKind {
    /// The container kind, if this drag moves a container rather than leaves
    pub fn container_kind(self) -> Option<ContainerKind> {
        match self {
            DragKind::Leaf => None,
            DragKind::Section => Some(ContainerKind::Section),
            DragKind::Subsection => Some(ContainerKind::Subsection),
        }
    }
}

impl std::fmt::Display for DragKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DragKind::Leaf => write!(f, "leaf"),
            DragKind::Section => write!(f, "section"),
            DragKind::Subsection => write!(f, "subsection"),
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerKind::Section => write!(f, "section"),
            ContainerKind::Subsection => write!(f, "subsection"),
        }
    }
}

/// The group being moved by one gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragSession {
    /// Leaf IDs in their relative source order
    pub dragged_ids: Vec<LeafId>,
    pub kind: DragKind,
}

impl DragSession {
    pub fn leaves(dragged_ids: Vec<LeafId>) -> Self {
        DragSession {
            dragged_ids,
            kind: DragKind::Leaf,
        }
    }
}

/// Where a gesture was released
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTarget {
    pub container_id: ContainerId,
    /// The item hovered at release; `None` appends to the container
    pub anchor_leaf_id: Option<LeafId>,
}

impl DropTarget {
    pub fn container(container_id: impl Into<ContainerId>) -> Self {
        DropTarget {
            container_id: container_id.into(),
            anchor_leaf_id: None,
        }
    }

    pub fn anchored(container_id: impl Into<ContainerId>, anchor: impl Into<LeafId>) -> Self {
        DropTarget {
            container_id: container_id.into(),
            anchor_leaf_id: Some(anchor.into()),
        }
    }
}

/// A drag-and-drop token split into its parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedToken {
    pub container_id: ContainerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf_id: Option<LeafId>,
}
