//! Outline engine for arranging content units into sections and subsections.
//!
//! The engine operations in [`ops`] are pure: each takes the current
//! [`Collection`] (and selection) and returns a new one, leaving the input
//! untouched. Persistence, locking and the `nd` command line live in [`io`]
//! and [`cli`].

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
pub mod util;

pub use model::gesture::{ContainerKind, DecodedToken, DragKind, DragSession, DropTarget};
pub use model::outline::{Collection, ContainerId, LeafId, Section, Subsection};
pub use model::project::ProjectFile;
pub use model::selection::SelectionState;
pub use ops::container_ops::apply_container_reorder;
pub use ops::playground_ops::{Placement, apply_staged_drop};
pub use ops::relocate::{NoOpReason, Relocation, RelocationStatus, apply_leaf_relocation};
pub use ops::selection_ops::toggle_selection;
pub use ops::token::{decode_token, encode_token};
