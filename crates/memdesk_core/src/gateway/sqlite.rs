//! SQLite-backed memory gateway.
//!
//! # Responsibility
//! - Serve query/create/remove against the local `memories` table.
//! - Translate storage faults into `GatewayError` at the boundary.
//!
//! # Invariants
//! - Search text matches key or content as a case-insensitive substring,
//!   folded with Unicode lowercase on both sides (`mem_lower`); LIKE
//!   wildcards in user input are matched literally.
//! - Calls run synchronously inside the returned futures; they do not yield
//!   while SQLite works.
//! - Results are ordered newest first (`created_at DESC, rowid DESC`).
//! - Removing an unknown key answers `deleted = false`.

use crate::db::{open_db, open_db_in_memory, DbError, LOWER_FN};
use crate::gateway::{GatewayError, GatewayResult, MemoryGateway};
use crate::model::entry::{Entry, EntryQuery, NewEntry, RemoveOutcome};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Category stored for entries created without one.
pub const DEFAULT_CATEGORY: &str = "core";

const MEMORY_SELECT_SQL: &str = "SELECT id, key, content, category, created_at FROM memories";

static LIKE_WILDCARD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[%_\\]").expect("valid like wildcard regex"));

impl From<DbError> for GatewayError {
    fn from(value: DbError) -> Self {
        Self::Unavailable(value.to_string())
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Unavailable(value.to_string())
    }
}

/// Memory gateway over one SQLite connection.
pub struct SqliteMemoryGateway {
    conn: Mutex<Connection>,
}

impl SqliteMemoryGateway {
    /// Wraps a connection prepared by `open_db` or `open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> GatewayResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> GatewayResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn connection(&self) -> GatewayResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| GatewayError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn query_sync(&self, query: &EntryQuery) -> GatewayResult<Vec<Entry>> {
        let mut sql = format!("{MEMORY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(text) = query.search_text.as_deref() {
            sql.push_str(&format!(
                " AND ({LOWER_FN}(key) LIKE ? ESCAPE '\\' OR {LOWER_FN}(content) LIKE ? ESCAPE '\\')"
            ));
            let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
        }
        if let Some(category) = query.category.as_deref() {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.to_string()));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let conn = self.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bind_values), parse_entry_row)?;
        let entries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn create_sync(&self, request: &NewEntry) -> GatewayResult<Entry> {
        let conn = self.connection()?;
        let existing: Option<String> = conn
            .query_row(
                "SELECT id FROM memories WHERE key = ?1",
                params![request.key],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(GatewayError::Rejected(format!(
                "memory key already exists: `{}`",
                request.key
            )));
        }

        let entry = Entry {
            id: Uuid::new_v4().to_string(),
            key: request.key.clone(),
            content: request.content.clone(),
            category: request
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        conn.execute(
            "INSERT INTO memories (id, key, content, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.id,
                entry.key,
                entry.content,
                entry.category,
                entry.timestamp
            ],
        )?;
        Ok(entry)
    }

    fn remove_sync(&self, key: &str) -> GatewayResult<RemoveOutcome> {
        let conn = self.connection()?;
        let changed = conn.execute("DELETE FROM memories WHERE key = ?1", params![key])?;
        Ok(RemoveOutcome {
            deleted: changed > 0,
        })
    }
}

#[async_trait]
impl MemoryGateway for SqliteMemoryGateway {
    async fn query(&self, query: &EntryQuery) -> GatewayResult<Vec<Entry>> {
        let result = self.query_sync(query);
        match &result {
            Ok(entries) => info!(
                "event=store_query module=gateway status=ok filtered={} count={}",
                !query.is_unfiltered(),
                entries.len()
            ),
            Err(err) => warn!("event=store_query module=gateway status=error error={err}"),
        }
        result
    }

    async fn create(&self, request: &NewEntry) -> GatewayResult<Entry> {
        let result = self.create_sync(request);
        match &result {
            Ok(_) => info!(
                "event=store_create module=gateway status=ok key={}",
                request.key
            ),
            Err(err) => warn!(
                "event=store_create module=gateway status=error key={} error={err}",
                request.key
            ),
        }
        result
    }

    async fn remove(&self, key: &str) -> GatewayResult<RemoveOutcome> {
        let result = self.remove_sync(key);
        match &result {
            Ok(outcome) => info!(
                "event=store_remove module=gateway status=ok key={key} deleted={}",
                outcome.deleted
            ),
            Err(err) => warn!("event=store_remove module=gateway status=error key={key} error={err}"),
        }
        result
    }
}

fn parse_entry_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
    Ok(Entry {
        id: row.get("id")?,
        key: row.get("key")?,
        content: row.get("content")?,
        category: row.get("category")?,
        timestamp: row.get("created_at")?,
    })
}

fn escape_like(raw: &str) -> String {
    LIKE_WILDCARD_RE.replace_all(raw, "\\$0").into_owned()
}
