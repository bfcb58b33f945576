pub mod atomic;
pub mod config_io;
pub mod deck_io;
pub mod lock;
pub mod state;
