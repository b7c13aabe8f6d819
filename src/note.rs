//! The Note record and the rules that apply to a single note.
//!
//! Everything here operates on one note in isolation: validation, tag
//! normalization, relevance scoring. Identity assignment and persistence
//! belong to [`crate::NoteStorage`].
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{normalize_tag, NoteError, Result};

/// Points for a query found in the title.
pub const TITLE_MATCH_SCORE: u32 = 10;
/// Points for a query found in the content.
pub const CONTENT_MATCH_SCORE: u32 = 5;
/// Points for each tag containing the query.
pub const TAG_MATCH_SCORE: u32 = 3;

/// Represents a single note in our system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier assigned by the store
    pub id: u64,
    /// Note title
    pub title: String,
    /// Note body
    pub content: String,
    /// Lowercase tags, in insertion order
    #[serde(default)]
    pub tags: Vec<String>,
    /// When the note was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Note {
    /// Creates an unsaved note. The ID stays 0 until the store assigns one.
    pub fn new(title: &str, content: &str, tags: &[String]) -> Self {
        let now = Utc::now();

        Note {
            id: 0,
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            tags: normalize_tags(tags),
            created_at: now,
            updated_at: now,
            is_archived: false,
            is_favorite: false,
        }
    }

    /// Checks that title and content are non-empty after trimming.
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.title, &self.content)
    }

    /// Adds a tag unless it is empty or already present.
    ///
    /// Returns `true` when the tag list changed.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = normalize_tag(tag);
        if tag.is_empty() || self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Removes the first tag equal to the normalized input.
    ///
    /// Returns `true` when a tag was removed.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let tag = normalize_tag(tag);
        match self.tags.iter().position(|t| *t == tag) {
            Some(index) => {
                self.tags.remove(index);
                true
            }
            None => false,
        }
    }

    /// Case-insensitive tag membership check.
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = normalize_tag(tag);
        self.tags.iter().any(|t| t.to_lowercase() == tag)
    }

    pub fn toggle_favorite(&mut self) {
        self.is_favorite = !self.is_favorite;
        self.touch();
    }

    pub fn toggle_archived(&mut self) {
        self.is_archived = !self.is_archived;
        self.touch();
    }

    /// Refreshes the last-updated timestamp.
    pub fn touch(&mut self) {
        // Clock skew must never put updated_at before created_at
        self.updated_at = Utc::now().max(self.created_at);
    }

    /// Relevance of this note for a search query.
    ///
    /// Substring matching, case-insensitive: title +10, content +5 and +3 for
    /// every tag containing the query. Zero means no match.
    pub fn search_score(&self, query: &str) -> u32 {
        let query = query.to_lowercase();
        let mut score = 0;

        if self.title.to_lowercase().contains(&query) {
            score += TITLE_MATCH_SCORE;
        }

        if self.content.to_lowercase().contains(&query) {
            score += CONTENT_MATCH_SCORE;
        }

        score += self
            .tags
            .iter()
            .filter(|tag| tag.to_lowercase().contains(&query))
            .count() as u32
            * TAG_MATCH_SCORE;

        score
    }

    /// A short preview of the content, cut on a character boundary.
    pub fn summary(&self, max_len: usize) -> String {
        match self.content.char_indices().nth(max_len) {
            Some((cut, _)) => format!("{}...", &self.content[..cut]),
            None => self.content.clone(),
        }
    }
}

/// Shared title/content check used before any mutation is committed.
pub fn validate_fields(title: &str, content: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(NoteError::validation("note title cannot be empty"));
    }
    if content.trim().is_empty() {
        return Err(NoteError::validation("note content cannot be empty"));
    }
    Ok(())
}

/// Normalizes a whole tag list: trimmed, lowercase, no empties, no duplicates.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = normalize_tag(tag);
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}
