//! Runtime configuration shared by the FFI panel and the CLI.
//!
//! # Invariants
//! - A blank `MEMDESK_DB_PATH` behaves like an unset one.

use std::path::PathBuf;

/// Environment variable naming the memory database file.
pub const DB_PATH_ENV: &str = "MEMDESK_DB_PATH";
/// File name used under the temp directory when no path is configured.
pub const DEFAULT_DB_FILE_NAME: &str = "memdesk.sqlite3";

/// Resolves the database path from `MEMDESK_DB_PATH`, falling back to the
/// temp directory.
pub fn resolve_db_path() -> PathBuf {
    db_path_from(std::env::var(DB_PATH_ENV).ok())
}

fn db_path_from(raw: Option<String>) -> PathBuf {
    match raw.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::{db_path_from, DEFAULT_DB_FILE_NAME};
    use std::path::PathBuf;

    #[test]
    fn explicit_path_wins() {
        assert_eq!(
            db_path_from(Some(" /data/mem.sqlite3 ".to_string())),
            PathBuf::from("/data/mem.sqlite3")
        );
    }

    #[test]
    fn blank_or_missing_falls_back_to_temp_dir() {
        let expected = std::env::temp_dir().join(DEFAULT_DB_FILE_NAME);
        assert_eq!(db_path_from(None), expected);
        assert_eq!(db_path_from(Some("  ".to_string())), expected);
    }
}
