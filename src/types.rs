//! Shared types for the clevernote application.
//!
//! This module contains the crate-wide Result alias, the list ordering modes,
//! and the subcommands of the command-line interface.
use std::{fmt, path::PathBuf};

use clap::{Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::{CnError, NotebookStyle};

/// A specialized Result type for clevernote operations.
pub type Result<T> = std::result::Result<T, CnError>;

/// Ordering applied to a list of notes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Most recently created first
    #[default]
    Newest,
    /// Oldest first
    Oldest,
    /// Alphabetical by title, locale aware
    Title,
    /// By raw color string
    Color,
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortMode::Newest => "newest",
            SortMode::Oldest => "oldest",
            SortMode::Title => "title",
            SortMode::Color => "color",
        };
        f.write_str(name)
    }
}

/// Available subcommands for the clevernote application
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note (blank, from a study template, or from a quick prompt)
    Create {
        /// Title of the note (defaults to the template or prompt title)
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// Page color as #rrggbb
        #[clap(short = 'C', long)]
        color: Option<String>,

        /// Page style
        #[clap(short, long, value_enum)]
        style: Option<NotebookStyle>,

        /// Initial content of the note
        #[clap(short, long, conflicts_with = "file")]
        content: Option<String>,

        /// Path to a file containing the note's content
        #[clap(short, long)]
        file: Option<PathBuf>,

        /// Start from a study template (see `templates`)
        #[clap(short = 'm', long, conflicts_with = "prompt")]
        template: Option<String>,

        /// Start from a quick prompt; the prompt becomes the default title
        #[clap(short, long)]
        prompt: Option<String>,

        /// Open content in editor before saving
        #[clap(short, long, conflicts_with_all = ["content", "file"])]
        edit: bool,
    },

    /// List notes, optionally searched, filtered and sorted
    List {
        /// Case-insensitive text to look for in titles and contents
        #[clap(short, long)]
        query: Option<String>,

        /// Only show favorite notes
        #[clap(short = 'F', long)]
        favorites: bool,

        /// Sort order
        #[clap(short, long, value_enum, default_value_t = SortMode::Newest)]
        sort: SortMode,

        /// Limit the number of notes shown (0 shows all)
        #[clap(short = 'n', long, default_value_t = 0)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,

        /// Show full contents instead of a preview
        #[clap(short, long)]
        detailed: bool,
    },

    /// View a note by ID
    View {
        /// ID of the note to view
        id: i64,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Replace the content of a note
    Edit {
        /// ID of the note to edit
        id: i64,

        /// New content for the note
        #[clap(short, long, conflicts_with = "file")]
        content: Option<String>,

        /// Path to a file containing the new note content
        #[clap(short, long)]
        file: Option<PathBuf>,
    },

    /// Toggle the favorite flag of a note
    Favorite {
        /// ID of the note
        id: i64,
    },

    /// Delete a note by ID
    Delete {
        /// ID of the note to delete
        id: i64,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Show the most recently created notes
    Recent {
        /// Only show favorite notes
        #[clap(short = 'F', long)]
        favorites: bool,

        /// Number of notes to show (defaults to the configured limit)
        #[clap(short = 'n', long)]
        limit: Option<usize>,
    },

    /// List study templates and quick prompts
    Templates,

    /// Store local credentials and mark the device as logged in
    Login {
        /// E-mail address
        #[clap(short, long)]
        email: String,

        /// Password
        #[clap(short, long)]
        password: String,
    },

    /// Mark the device as logged out and forget stored credentials
    Logout,

    /// Show the login state, or flip it with --toggle
    Account {
        /// Flip between logged in and guest mode
        #[clap(short, long)]
        toggle: bool,
    },

    /// Show the friends list (requires login)
    Friends,
}
