//! Memory entry record and gateway request shapes.
//!
//! # Responsibility
//! - Carry entries exactly as the store reports them.
//! - Derive the bounded list preview of entry content.
//! - Normalize optional filter/category inputs (blank means absent).
//!
//! # Invariants
//! - `Entry::key` is unique within the store at any point in time.
//! - Previews never exceed `CONTENT_PREVIEW_CHARS` characters plus ellipsis.

use serde::{Deserialize, Serialize};

/// Maximum number of content characters shown in list rows.
pub const CONTENT_PREVIEW_CHARS: usize = 80;
/// Suffix appended to truncated previews.
pub const PREVIEW_ELLIPSIS: &str = "...";

/// One record of the remote memory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Stable store-assigned identifier for rendering; selection and
    /// deletion use `key`, never `id`.
    pub id: String,
    /// Operator-chosen natural identifier.
    pub key: String,
    /// Full, untruncated content.
    pub content: String,
    pub category: String,
    /// ISO-8601 timestamp as reported by the store.
    pub timestamp: String,
}

impl Entry {
    /// Content truncated for list display.
    pub fn content_preview(&self) -> String {
        truncate_preview(&self.content, CONTENT_PREVIEW_CHARS)
    }
}

/// Truncates `content` to `max_chars` characters, appending an ellipsis when cut.
pub fn truncate_preview(content: &str, max_chars: usize) -> String {
    let mut chars = content.char_indices();
    match chars.nth(max_chars) {
        None => content.to_string(),
        Some((cut, _)) => format!("{}{PREVIEW_ELLIPSIS}", &content[..cut]),
    }
}

/// Filters for one gateway query. `None` means unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryQuery {
    pub search_text: Option<String>,
    pub category: Option<String>,
}

impl EntryQuery {
    /// Unfiltered query used for the initial load.
    pub fn unfiltered() -> Self {
        Self::default()
    }

    /// Builds a query from raw filter inputs; blank inputs become `None`.
    pub fn from_filters(search_text: &str, category: &str) -> Self {
        Self {
            search_text: non_blank(search_text),
            category: non_blank(category),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.search_text.is_none() && self.category.is_none()
    }
}

/// Validated create request sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    /// Trimmed, non-empty key.
    pub key: String,
    /// Trimmed, non-empty content.
    pub content: String,
    /// Trimmed category, absent when blank.
    pub category: Option<String>,
}

/// Gateway answer to a remove request.
///
/// `deleted == false` means the store did not delete anything (e.g. unknown key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveOutcome {
    pub deleted: bool,
}

/// Returns the trimmed value, or `None` when it is blank.
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{non_blank, truncate_preview, Entry, EntryQuery, CONTENT_PREVIEW_CHARS};

    fn entry_with_content(content: &str) -> Entry {
        Entry {
            id: "1".to_string(),
            key: "k".to_string(),
            content: content.to_string(),
            category: "core".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn preview_keeps_short_content_verbatim() {
        let entry = entry_with_content("dark mode");
        assert_eq!(entry.content_preview(), "dark mode");

        let exact = "x".repeat(CONTENT_PREVIEW_CHARS);
        assert_eq!(truncate_preview(&exact, CONTENT_PREVIEW_CHARS), exact);
    }

    #[test]
    fn preview_truncates_long_content_on_char_boundary() {
        let long = "é".repeat(CONTENT_PREVIEW_CHARS + 5);
        let entry = entry_with_content(&long);
        let preview = entry.content_preview();
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), CONTENT_PREVIEW_CHARS + 3);
        assert_eq!(entry.content, long);
    }

    #[test]
    fn blank_filters_mean_unfiltered() {
        let query = EntryQuery::from_filters("   ", "\t");
        assert!(query.is_unfiltered());

        let query = EntryQuery::from_filters(" dark ", "prefs");
        assert_eq!(query.search_text.as_deref(), Some("dark"));
        assert_eq!(query.category.as_deref(), Some("prefs"));
        assert_eq!(non_blank(""), None);
    }
}
