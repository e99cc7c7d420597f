//! Boundary toward the remote memory store.
//!
//! # Responsibility
//! - Define the async query/create/remove contract the controller depends on.
//! - Normalize every store fault into a message-carrying `GatewayError`.
//!
//! # Invariants
//! - `remove` reports "not found" as `deleted = false`, never as an error.
//! - Timeouts and retries belong to implementations, not to callers.

use crate::model::entry::{Entry, EntryQuery, NewEntry, RemoveOutcome};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod mock;
pub mod sqlite;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure reported by a memory gateway.
///
/// Callers only distinguish success from failure and show the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The store refused the request (e.g. duplicate key).
    Rejected(String),
    /// The store could not be reached or failed internally.
    Unavailable(String),
}

impl GatewayError {
    /// Human-readable message for banners and form errors.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(message) => write!(f, "{message}"),
            Self::Unavailable(message) => write!(f, "memory store unavailable: {message}"),
        }
    }
}

impl Error for GatewayError {}

/// Async contract of the remote memory store.
#[async_trait]
pub trait MemoryGateway: Send + Sync {
    /// Returns every entry matching `query`, in store order.
    async fn query(&self, query: &EntryQuery) -> GatewayResult<Vec<Entry>>;

    /// Stores a new entry and returns it as persisted.
    async fn create(&self, request: &NewEntry) -> GatewayResult<Entry>;

    /// Removes the entry with `key`.
    async fn remove(&self, key: &str) -> GatewayResult<RemoveOutcome>;
}
