//! Serializable read-only view of the controller for presentation layers.

use crate::state::draft::CreateDraft;
use crate::state::entries::LoadPhase;
use serde::Serialize;

/// One list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryRow {
    pub id: String,
    pub key: String,
    /// Content cut to the list preview length.
    pub preview: String,
    /// Full content for detail views.
    pub content: String,
    pub category: String,
    pub timestamp: String,
    pub selected: bool,
    pub delete_armed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerSnapshot {
    pub phase: LoadPhase,
    pub loading: bool,
    pub rows: Vec<EntryRow>,
    pub search_text: String,
    pub category_filter: String,
    /// Distinct categories of the loaded rows, sorted.
    pub categories: Vec<String>,
    /// Selected keys in row order.
    pub selected_keys: Vec<String>,
    pub all_selected: bool,
    pub draft: CreateDraft,
    pub armed_delete_key: Option<String>,
    pub batch_delete_armed: bool,
    pub banner: Option<String>,
}
