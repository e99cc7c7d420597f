//! Connection bootstrap for the local memory store.
//!
//! # Responsibility
//! - Hand out SQLite connections that `SqliteMemoryGateway` can use as-is:
//!   migrated, with a busy timeout and the `mem_lower` search function.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - A file written by a newer schema is never opened for reads or writes.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, LOWER_FN};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while preparing a memory database connection.
#[derive(Debug)]
pub enum DbError {
    /// The connection itself could not be established.
    Open {
        mode: &'static str,
        source: rusqlite::Error,
    },
    /// A bootstrap statement (pragma, function, migration) failed.
    Bootstrap(rusqlite::Error),
    /// The file carries a schema version this build does not know.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { mode, source } => {
                write!(f, "cannot open {mode} memory database: {source}")
            }
            Self::Bootstrap(err) => write!(f, "memory database setup failed: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "memory database uses schema {found}; this build reads up to {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Bootstrap(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Bootstrap(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use std::error::Error;

    #[test]
    fn schema_too_new_names_both_versions() {
        let err = DbError::SchemaTooNew {
            found: 4,
            supported: 1,
        };
        assert_eq!(
            err.to_string(),
            "memory database uses schema 4; this build reads up to 1"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn open_failure_keeps_sqlite_source() {
        let err = DbError::Open {
            mode: "file",
            source: rusqlite::Error::InvalidQuery,
        };
        assert!(err.to_string().starts_with("cannot open file memory database"));
        assert!(err.source().is_some());
    }
}
