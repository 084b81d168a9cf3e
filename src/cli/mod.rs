//! Command-line front end for clevernote.
mod app;
mod main;

pub use app::*;
pub use main::*;
