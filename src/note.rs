//! Core data structures for the clevernote application.
//!
//! This module contains the `Note` record as it is persisted, the notebook
//! page styles, and the validated `NoteDraft` used to create new notes.
use std::fmt;

use chrono::{DateTime, Local, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{CnError, Result};

/// Color assigned to stored notes that have none.
pub const DEFAULT_NOTE_COLOR: &str = "#f97316";

/// Title assigned to stored notes that have none.
pub const UNTITLED_NOTE_TITLE: &str = "Untitled note";

/// Display format of `Note::created_at` (day.month.year, 24h clock).
pub const CREATED_AT_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Visual page background of a note.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum NotebookStyle {
    #[default]
    Plain,
    Dotted,
    Lined,
    Grid,
}

impl NotebookStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotebookStyle::Plain => "plain",
            NotebookStyle::Dotted => "dotted",
            NotebookStyle::Lined => "lined",
            NotebookStyle::Grid => "grid",
        }
    }

    /// Parses a stored style name, `None` for anything unknown.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "plain" => Some(NotebookStyle::Plain),
            "dotted" => Some(NotebookStyle::Dotted),
            "lined" => Some(NotebookStyle::Lined),
            "grid" => Some(NotebookStyle::Grid),
            _ => None,
        }
    }
}

impl fmt::Display for NotebookStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a single note in our system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Creation timestamp in milliseconds, unique within a collection
    pub id: i64,
    /// Note title
    pub title: String,
    /// Page color as `#rrggbb`
    pub color: String,
    /// Human readable creation time, fixed at creation
    pub created_at: String,
    /// Creation time in milliseconds, used for chronological ordering
    pub created_at_ms: i64,
    /// Free-form note body
    pub content: String,
    /// Page background style
    pub notebook_style: NotebookStyle,
    /// Whether the user marked the note as a favorite
    pub is_favorite: bool,
}

impl Note {
    /// Builds a note from a validated draft, stamped with the given id.
    ///
    /// The id doubles as the creation timestamp, so `created_at_ms` and the
    /// display string are both derived from it.
    pub(crate) fn from_draft(draft: NoteDraft, id: i64) -> Self {
        Note {
            id,
            title: draft.title,
            color: draft.color,
            created_at: format_created_at(id),
            created_at_ms: id,
            content: draft.content.unwrap_or_default(),
            notebook_style: draft.style,
            is_favorite: false,
        }
    }
}

/// Validated input for creating a note.
///
/// Construction trims the title and normalizes the color, so a draft that
/// exists always satisfies the creation preconditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    title: String,
    color: String,
    style: NotebookStyle,
    content: Option<String>,
}

impl NoteDraft {
    pub fn new(title: &str, color: &str, style: NotebookStyle) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CnError::InvalidTitle);
        }

        let color = normalize_color(color).ok_or_else(|| CnError::InvalidColor {
            value: color.to_string(),
        })?;

        Ok(NoteDraft {
            title: title.to_string(),
            color,
            style,
            content: None,
        })
    }

    /// Sets the body the note starts with.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn style(&self) -> NotebookStyle {
        self.style
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

/// Normalizes free-text color input to a lowercase `#rrggbb` string.
///
/// Surrounding whitespace is ignored and a missing leading `#` is added.
/// Returns `None` for anything that is not exactly six hex digits.
pub fn normalize_color(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    Some(format!("#{}", digits.to_ascii_lowercase()))
}

/// Renders a millisecond timestamp the way notes display their creation time.
pub fn format_created_at(timestamp_ms: i64) -> String {
    let utc = DateTime::<Utc>::from_timestamp_millis(timestamp_ms).unwrap_or_default();
    utc.with_timezone(&Local)
        .format(CREATED_AT_FORMAT)
        .to_string()
}
