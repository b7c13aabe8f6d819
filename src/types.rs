//! Core data structures for the quicknotes application.
//!
//! This module contains the supporting types used throughout the application:
//! the result alias, aggregate statistics, load summaries and the CLI
//! subcommands.
use std::path::PathBuf;

use clap::Subcommand;
use serde::{Deserialize, Serialize};

use crate::NoteError;

/// A specialized Result type for quicknotes operations.
pub type Result<T> = std::result::Result<T, NoteError>;

/// Aggregate counts over every note in the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteStats {
    /// Every note, archived or not
    pub total: usize,
    /// Notes that are not archived
    pub active: usize,
    /// Archived notes
    pub archived: usize,
    /// Favorite notes, archived or not
    pub favorites: usize,
    /// Distinct tags across non-archived notes
    pub tags: usize,
}

/// Summary of loading the notes directory at startup
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// Number of notes now held in memory
    pub notes_loaded: usize,
    /// The ID the next created note will receive
    pub next_id: u64,
    /// Files that could not be loaded
    pub skipped_files: Vec<(PathBuf, String)>, // (path, error_message)
}

/// Available subcommands for the quicknotes application
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new note
    Create {
        /// Title of the note
        title: String,

        /// Content of the note
        content: String,

        /// Tags to associate with the note (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,
    },

    /// List notes with optional filtering
    List {
        /// Show all notes including archived
        #[clap(short, long)]
        all: bool,

        /// Show only favorite notes
        #[clap(short, long)]
        favorites: bool,

        /// Show non-archived notes with a specific tag
        #[clap(short, long)]
        tag: Option<String>,

        /// Limit the number of notes shown (0 means no limit)
        #[clap(short = 'n', long, default_value_t = 0)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// View a note by ID
    View {
        /// ID of the note to view
        id: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Edit an existing note
    Edit {
        /// ID of the note to edit
        id: String,

        /// New title for the note
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New content for the note
        #[clap(short, long)]
        content: Option<String>,

        /// Replace the note's tags (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,
    },

    /// Delete a note by ID
    Delete {
        /// ID of the note to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Search notes by title, content or tags
    Search {
        /// Search query text
        query: String,

        /// Limit the number of search results (0 means no limit)
        #[clap(short = 'n', long, default_value_t = 0)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show note statistics
    Stats,

    /// Tag operations (add, remove, list)
    Tag {
        /// ID of the note to modify
        id: Option<String>,

        /// Tags to add (comma-separated)
        tags: Option<String>,

        /// Remove a specific tag
        #[clap(short, long)]
        remove: Option<String>,

        /// List all tags
        #[clap(short, long)]
        list: bool,
    },

    /// Toggle the favorite flag of a note
    Favorite {
        /// ID of the note
        id: String,
    },

    /// Archive or unarchive a note
    Archive {
        /// ID of the note
        id: String,
    },

    /// Run the REST API and web console
    Serve {
        /// Address to bind (default uses config setting)
        #[clap(long)]
        address: Option<String>,

        /// Port to listen on (default uses config setting)
        #[clap(short, long)]
        port: Option<u16>,
    },
}
