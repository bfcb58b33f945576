pub mod outline;
pub mod gesture;
pub mod selection;
pub mod project;
pub mod deck;
pub mod config;

pub use outline::*;
pub use gesture::*;
pub use selection::*;
pub use project::*;
pub use deck::*;
pub use config::*;
