//! Recording in-memory gateway for tests and demos.
//!
//! Seeded with entries, records every call, and can be told to fail queries,
//! creates, or removal of specific keys.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};

use crate::gateway::{GatewayError, GatewayResult, MemoryGateway};
use crate::model::entry::{Entry, EntryQuery, NewEntry, RemoveOutcome};

/// Category assigned to entries created without one.
pub const MOCK_DEFAULT_CATEGORY: &str = "core";

/// A recorded call to the mock gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Query(EntryQuery),
    Create(NewEntry),
    Remove(String),
}

/// Mock implementation of `MemoryGateway`.
#[derive(Default)]
pub struct MockMemoryGateway {
    entries: Mutex<Vec<Entry>>,
    calls: Mutex<Vec<MockCall>>,
    query_error: Mutex<Option<GatewayError>>,
    create_error: Mutex<Option<GatewayError>>,
    remove_errors: Mutex<HashMap<String, GatewayError>>,
    undeletable: Mutex<HashSet<String>>,
    next_id: Mutex<u64>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl MockMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store; query results keep insertion order.
    pub fn with_entry(self, entry: Entry) -> Self {
        lock(&self.entries).push(entry);
        self
    }

    /// Seeds one entry per `(key, content, category)` triple.
    pub fn with_entries(self, rows: &[(&str, &str, &str)]) -> Self {
        rows.iter().fold(self, |gateway, (key, content, category)| {
            let entry = gateway.build_entry(key, content, category);
            gateway.with_entry(entry)
        })
    }

    /// Makes every subsequent query fail.
    pub fn with_query_error(self, err: GatewayError) -> Self {
        self.set_query_error(Some(err));
        self
    }

    /// Makes every subsequent create fail.
    pub fn with_create_error(self, err: GatewayError) -> Self {
        *lock(&self.create_error) = Some(err);
        self
    }

    /// Makes removal of `key` fail with `err`.
    pub fn with_remove_error(self, key: &str, err: GatewayError) -> Self {
        lock(&self.remove_errors).insert(key.to_string(), err);
        self
    }

    /// Makes removal of `key` answer `deleted = false` while keeping the entry.
    pub fn with_undeletable(self, key: &str) -> Self {
        lock(&self.undeletable).insert(key.to_string());
        self
    }

    /// Sets or clears the query failure after construction.
    pub fn set_query_error(&self, err: Option<GatewayError>) {
        *lock(&self.query_error) = err;
    }

    /// Returns all recorded calls.
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Keys passed to `remove`, in call order.
    pub fn removed_keys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Remove(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    /// Number of `create` calls seen.
    pub fn create_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, MockCall::Create(_)))
            .count()
    }

    /// Keys currently held by the store.
    pub fn stored_keys(&self) -> Vec<String> {
        lock(&self.entries)
            .iter()
            .map(|entry| entry.key.clone())
            .collect()
    }

    fn build_entry(&self, key: &str, content: &str, category: &str) -> Entry {
        let mut next_id = lock(&self.next_id);
        *next_id += 1;
        Entry {
            id: format!("mock-{}", *next_id),
            key: key.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    fn record(&self, call: MockCall) {
        lock(&self.calls).push(call);
    }
}

fn matches_query(entry: &Entry, query: &EntryQuery) -> bool {
    if let Some(category) = query.category.as_deref() {
        if entry.category != category {
            return false;
        }
    }
    match query.search_text.as_deref() {
        None => true,
        Some(text) => {
            let needle = text.to_lowercase();
            entry.key.to_lowercase().contains(&needle)
                || entry.content.to_lowercase().contains(&needle)
        }
    }
}

#[async_trait]
impl MemoryGateway for MockMemoryGateway {
    async fn query(&self, query: &EntryQuery) -> GatewayResult<Vec<Entry>> {
        self.record(MockCall::Query(query.clone()));
        if let Some(err) = lock(&self.query_error).clone() {
            return Err(err);
        }
        Ok(lock(&self.entries)
            .iter()
            .filter(|entry| matches_query(entry, query))
            .cloned()
            .collect())
    }

    async fn create(&self, request: &NewEntry) -> GatewayResult<Entry> {
        self.record(MockCall::Create(request.clone()));
        if let Some(err) = lock(&self.create_error).clone() {
            return Err(err);
        }
        if lock(&self.entries)
            .iter()
            .any(|entry| entry.key == request.key)
        {
            return Err(GatewayError::Rejected(format!(
                "memory key already exists: `{}`",
                request.key
            )));
        }

        let category = request
            .category
            .as_deref()
            .unwrap_or(MOCK_DEFAULT_CATEGORY);
        let entry = self.build_entry(&request.key, &request.content, category);
        lock(&self.entries).push(entry.clone());
        Ok(entry)
    }

    async fn remove(&self, key: &str) -> GatewayResult<RemoveOutcome> {
        self.record(MockCall::Remove(key.to_string()));
        if let Some(err) = lock(&self.remove_errors).get(key).cloned() {
            return Err(err);
        }
        if lock(&self.undeletable).contains(key) {
            return Ok(RemoveOutcome { deleted: false });
        }

        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|entry| entry.key != key);
        Ok(RemoveOutcome {
            deleted: entries.len() < before,
        })
    }
}
