//! Clever Note application library
//!
//! This library manages a collection of colored notebook pages: creating,
//! searching, sorting, favoriting and deleting notes, and persisting the
//! collection as one JSON blob in a key-value store.

mod account;
mod cli;
mod collection;
mod config;
mod errors;
mod friends;
mod helper;
mod note;
mod persistence;
mod storage;
mod templates;
mod types;

// Re-export key components
pub use account::*;
pub use cli::*;
pub use collection::*;
pub use config::*;
pub use errors::*;
pub use friends::*;
pub use helper::*;
pub use note::*;
pub use persistence::*;
pub use storage::*;
pub use templates::*;
pub use types::*;
