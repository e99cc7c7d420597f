//! Entry collection state and query sequencing.
//!
//! # Responsibility
//! - Hold the last applied entry list with its loading/error status.
//! - Discard query results that resolve after a newer result was applied.
//!
//! # Invariants
//! - `loading` is true only while the newest issued query is unresolved.
//! - A successful result replaces `entries` wholesale, in gateway order.
//! - A failed result sets `error` and leaves `entries` untouched.
//! - A result older than the last applied one never touches state.

use crate::model::entry::Entry;
use serde::Serialize;
use std::collections::BTreeSet;

/// Handle for one issued query, ordered by issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryTicket {
    seq: u64,
}

impl QueryTicket {
    pub fn seq(self) -> u64 {
        self.seq
    }
}

/// What happened to a resolved query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResolution {
    /// Result replaced the entry list.
    Applied,
    /// Failure was recorded; entries kept.
    Failed(String),
    /// A newer result had already been applied; nothing changed.
    Stale,
}

/// How the presentation layer should frame the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum LoadPhase {
    /// Nothing to show yet and a query is outstanding.
    Loading,
    /// Nothing to show and the last query failed: full-page failure.
    Failed { message: String },
    /// List is shown; a failed refresh appears as a dismissible banner.
    Ready { banner: Option<String> },
}

#[derive(Debug, Clone, Default)]
pub struct EntryCollection {
    entries: Vec<Entry>,
    loading: bool,
    error: Option<String>,
    issued_seq: u64,
    applied_seq: u64,
}

impl EntryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// Marks a new query as outstanding. The previous error stays visible.
    pub fn begin_query(&mut self) -> QueryTicket {
        self.issued_seq += 1;
        self.loading = true;
        QueryTicket {
            seq: self.issued_seq,
        }
    }

    /// Applies the outcome of the query identified by `ticket`.
    pub fn resolve(
        &mut self,
        ticket: QueryTicket,
        result: Result<Vec<Entry>, String>,
    ) -> QueryResolution {
        if ticket.seq <= self.applied_seq {
            return QueryResolution::Stale;
        }
        self.applied_seq = ticket.seq;
        self.loading = self.applied_seq < self.issued_seq;

        match result {
            Ok(entries) => {
                self.entries = entries;
                self.error = None;
                QueryResolution::Applied
            }
            Err(message) => {
                self.error = Some(message.clone());
                QueryResolution::Failed(message)
            }
        }
    }

    /// Splices out the entry with `key`. Returns whether one was removed.
    pub fn remove_key(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.key != key);
        self.entries.len() < before
    }

    /// Distinct categories of the loaded entries, sorted ascending.
    pub fn categories(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn load_phase(&self) -> LoadPhase {
        if self.entries.is_empty() {
            if self.loading {
                return LoadPhase::Loading;
            }
            if let Some(message) = &self.error {
                return LoadPhase::Failed {
                    message: message.clone(),
                };
            }
        }
        LoadPhase::Ready {
            banner: self.error.clone(),
        }
    }
}
