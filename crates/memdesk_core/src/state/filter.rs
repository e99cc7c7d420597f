//! Search/category filter drafts.
//!
//! # Invariants
//! - Editing drafts never issues a query.
//! - `committed()` only changes on `commit()`.

use crate::model::entry::EntryQuery;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    search_text: String,
    category: String,
    committed: EntryQuery,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn set_search_text(&mut self, value: impl Into<String>) {
        self.search_text = value.into();
    }

    /// Empty string selects "all categories".
    pub fn set_category(&mut self, value: impl Into<String>) {
        self.category = value.into();
    }

    /// Freezes the current drafts as the active query and returns it.
    pub fn commit(&mut self) -> EntryQuery {
        self.committed = EntryQuery::from_filters(&self.search_text, &self.category);
        self.committed.clone()
    }

    /// Query applied by the last commit (unfiltered before the first one).
    pub fn committed(&self) -> &EntryQuery {
        &self.committed
    }
}
