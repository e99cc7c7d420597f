//! Multi-select set of entry keys.
//!
//! # Responsibility
//! - Track which displayed entries the operator selected, by key.
//!
//! # Invariants
//! - Every selected key belongs to the displayed entries it was checked against.
//! - `toggle_all` is a two-state switch between empty and "all displayed".

use crate::model::entry::Entry;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    keys: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Selected keys in ascending order.
    pub fn keys(&self) -> Vec<String> {
        self.keys.iter().cloned().collect()
    }

    /// Selected keys in display order of `displayed`.
    pub fn ordered_keys(&self, displayed: &[Entry]) -> Vec<String> {
        displayed
            .iter()
            .filter(|entry| self.keys.contains(&entry.key))
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Flips membership of `key`. Keys not displayed are ignored.
    ///
    /// Returns whether `key` is selected afterwards.
    pub fn toggle(&mut self, key: &str, displayed: &[Entry]) -> bool {
        if self.keys.remove(key) {
            return false;
        }
        if displayed.iter().any(|entry| entry.key == key) {
            self.keys.insert(key.to_string());
            return true;
        }
        false
    }

    /// Whether the selection equals the set of distinct displayed keys.
    pub fn is_all_selected(&self, displayed: &[Entry]) -> bool {
        let shown: BTreeSet<&str> = displayed.iter().map(|entry| entry.key.as_str()).collect();
        !shown.is_empty()
            && self.keys.len() == shown.len()
            && shown.iter().all(|key| self.keys.contains(*key))
    }

    /// Empty if everything displayed is selected, otherwise everything displayed.
    pub fn toggle_all(&mut self, displayed: &[Entry]) {
        if self.is_all_selected(displayed) {
            self.keys.clear();
        } else {
            self.keys = displayed.iter().map(|entry| entry.key.clone()).collect();
        }
    }

    /// Drops each of `removed` from the selection.
    pub fn prune<'a>(&mut self, removed: impl IntoIterator<Item = &'a str>) {
        for key in removed {
            self.keys.remove(key);
        }
    }

    /// Drops every key no longer present in `displayed`; returns the dropped keys.
    pub fn retain_displayed(&mut self, displayed: &[Entry]) -> Vec<String> {
        let gone: Vec<String> = self
            .keys
            .iter()
            .filter(|key| !displayed.iter().any(|entry| &entry.key == *key))
            .cloned()
            .collect();
        self.prune(gone.iter().map(String::as_str));
        gone
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}
