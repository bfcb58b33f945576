pub mod check;
pub mod container_ops;
pub mod export;
pub mod outline_ops;
pub mod playground_ops;
pub mod project_ops;
pub mod relocate;
pub mod search;
pub mod selection_ops;
pub mod token;
