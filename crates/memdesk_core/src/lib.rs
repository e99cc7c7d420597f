//! Core of the memory panel controller.
//! This crate is the single source of truth for panel state invariants.

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod service;
pub mod state;

pub use config::resolve_db_path;
pub use gateway::mock::{MockCall, MockMemoryGateway};
pub use gateway::sqlite::SqliteMemoryGateway;
pub use gateway::{GatewayError, GatewayResult, MemoryGateway};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{Entry, EntryQuery, NewEntry, RemoveOutcome, CONTENT_PREVIEW_CHARS};
pub use service::delete_coordinator::{BatchDeleteReport, DeleteError};
pub use service::memory_controller::{CreateEntryError, MemoryController};
pub use service::snapshot::{ControllerSnapshot, EntryRow};
pub use state::draft::DraftValidationError;
pub use state::entries::{LoadPhase, QueryResolution, QueryTicket};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
