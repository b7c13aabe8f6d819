//! Personal note-taking application library
//!
//! This library provides functionality for creating, storing, tagging,
//! searching and archiving short text notes, persisted as one JSON file per
//! note, with a command-line front end and a small REST API.

mod cli;
mod config;
mod errors;
mod helper;
mod note;
pub mod server;
mod storage;
mod types;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use note::*;
pub use storage::*;
pub use types::*;
