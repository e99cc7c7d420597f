//! FFI memory-panel API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the panel operations to Dart via FRB as flat envelopes.
//! - Own the single process-wide controller over the configured store.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every panel call answers with a full snapshot taken after the call.
//! - Queries run without holding the panel lock; late results are discarded
//!   by the controller's sequence check. The SQLite gateway itself blocks
//!   the calling thread for the duration of a query.

use log::{error, info};
use memdesk_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    resolve_db_path, BatchDeleteReport, ControllerSnapshot, EntryQuery, LoadPhase,
    MemoryController, MemoryGateway, QueryResolution, SqliteMemoryGateway,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

type PanelController = MemoryController<SqliteMemoryGateway>;

static PANEL: OnceCell<Mutex<PanelController>> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One list row of the memory panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelEntry {
    pub id: String,
    pub key: String,
    /// Content cut to 80 characters plus ellipsis.
    pub preview: String,
    pub content: String,
    pub category: String,
    pub timestamp: String,
    pub selected: bool,
    pub delete_armed: bool,
}

/// Flat panel state for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelSnapshot {
    /// `loading|failed|ready`.
    pub phase: String,
    /// Set when `phase == "failed"`: render a full-page error.
    pub fatal_error: Option<String>,
    /// Refresh failure over a still-visible list.
    pub load_banner: Option<String>,
    pub loading: bool,
    pub entries: Vec<PanelEntry>,
    pub search_text: String,
    pub category_filter: String,
    pub categories: Vec<String>,
    pub selected_keys: Vec<String>,
    pub all_selected: bool,
    pub form_open: bool,
    pub draft_key: String,
    pub draft_content: String,
    pub draft_category: String,
    pub submitting: bool,
    pub form_error: Option<String>,
    pub armed_delete_key: Option<String>,
    pub batch_delete_armed: bool,
    /// Delete or batch-delete failure.
    pub action_banner: Option<String>,
}

/// Envelope returned by every panel call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelResponse {
    /// Whether the requested operation succeeded.
    pub ok: bool,
    /// Human-readable outcome for diagnostics/UI.
    pub message: String,
    pub snapshot: PanelSnapshot,
}

impl PanelResponse {
    fn from_controller(controller: &PanelController, ok: bool, message: impl Into<String>) -> Self {
        Self {
            ok,
            message: message.into(),
            snapshot: to_panel_snapshot(controller.snapshot()),
        }
    }

    fn unavailable(message: String) -> Self {
        Self {
            ok: false,
            snapshot: PanelSnapshot {
                phase: "failed".to_string(),
                fatal_error: Some(message.clone()),
                ..PanelSnapshot::default()
            },
            message,
        }
    }
}

/// Initial unfiltered load.
pub async fn panel_load() -> PanelResponse {
    run_query(|_| EntryQuery::unfiltered()).await
}

/// Re-runs the last committed search.
pub async fn panel_refresh() -> PanelResponse {
    run_query(|controller| controller.filter().committed().clone()).await
}

/// Current state without side effects.
pub async fn panel_snapshot() -> PanelResponse {
    match lock_panel().await {
        Ok(controller) => PanelResponse::from_controller(&controller, true, ""),
        Err(response) => response,
    }
}

/// Updates the search/category drafts. Does not query.
pub async fn panel_set_filters(search_text: String, category: String) -> PanelResponse {
    let mut controller = match lock_panel().await {
        Ok(controller) => controller,
        Err(response) => return response,
    };
    controller.set_search_text(search_text);
    controller.set_category_filter(category);
    PanelResponse::from_controller(&controller, true, "")
}

/// Search button / Enter key: commits the drafts and queries.
pub async fn panel_search() -> PanelResponse {
    run_query(|controller| controller.commit_filter_drafts()).await
}

pub async fn panel_toggle_select(key: String) -> PanelResponse {
    let mut controller = match lock_panel().await {
        Ok(controller) => controller,
        Err(response) => return response,
    };
    controller.toggle_selection(&key);
    PanelResponse::from_controller(&controller, true, "")
}

pub async fn panel_toggle_select_all() -> PanelResponse {
    let mut controller = match lock_panel().await {
        Ok(controller) => controller,
        Err(response) => return response,
    };
    controller.toggle_select_all();
    PanelResponse::from_controller(&controller, true, "")
}

pub async fn panel_open_form() -> PanelResponse {
    let mut controller = match lock_panel().await {
        Ok(controller) => controller,
        Err(response) => return response,
    };
    controller.open_create_form();
    PanelResponse::from_controller(&controller, true, "")
}

/// Closes the create form and discards the draft.
pub async fn panel_cancel_form() -> PanelResponse {
    let mut controller = match lock_panel().await {
        Ok(controller) => controller,
        Err(response) => return response,
    };
    controller.cancel_create_form();
    PanelResponse::from_controller(&controller, true, "")
}

pub async fn panel_update_draft(key: String, content: String, category: String) -> PanelResponse {
    let mut controller = match lock_panel().await {
        Ok(controller) => controller,
        Err(response) => return response,
    };
    controller.set_draft_key(key);
    controller.set_draft_content(content);
    controller.set_draft_category(category);
    PanelResponse::from_controller(&controller, true, "")
}

/// Validates and submits the draft; the list is re-queried on success.
pub async fn panel_submit_form() -> PanelResponse {
    let mut controller = match lock_panel().await {
        Ok(controller) => controller,
        Err(response) => return response,
    };
    match controller.submit_create().await {
        Ok(entry) => {
            let message = format!("Memory `{}` saved.", entry.key);
            PanelResponse::from_controller(&controller, true, message)
        }
        Err(err) => PanelResponse::from_controller(&controller, false, err.to_string()),
    }
}

/// Arms the delete confirmation for `key`.
pub async fn panel_request_delete(key: String) -> PanelResponse {
    let mut controller = match lock_panel().await {
        Ok(controller) => controller,
        Err(response) => return response,
    };
    if controller.request_delete(&key) {
        PanelResponse::from_controller(&controller, true, "")
    } else {
        PanelResponse::from_controller(&controller, false, format!("memory `{key}` is not listed"))
    }
}

pub async fn panel_cancel_delete() -> PanelResponse {
    let mut controller = match lock_panel().await {
        Ok(controller) => controller,
        Err(response) => return response,
    };
    controller.cancel_delete();
    PanelResponse::from_controller(&controller, true, "")
}

pub async fn panel_confirm_delete(key: String) -> PanelResponse {
    let mut controller = match lock_panel().await {
        Ok(controller) => controller,
        Err(response) => return response,
    };
    match controller.confirm_delete(&key).await {
        Ok(()) => {
            PanelResponse::from_controller(&controller, true, format!("Memory `{key}` deleted."))
        }
        Err(err) => PanelResponse::from_controller(&controller, false, err.to_string()),
    }
}

/// Arms the batch confirmation; fails when nothing is selected.
pub async fn panel_request_batch_delete() -> PanelResponse {
    let mut controller = match lock_panel().await {
        Ok(controller) => controller,
        Err(response) => return response,
    };
    if controller.request_batch_delete() {
        PanelResponse::from_controller(&controller, true, "")
    } else {
        PanelResponse::from_controller(&controller, false, "No memories selected.")
    }
}

pub async fn panel_cancel_batch_delete() -> PanelResponse {
    let mut controller = match lock_panel().await {
        Ok(controller) => controller,
        Err(response) => return response,
    };
    controller.cancel_batch_delete();
    PanelResponse::from_controller(&controller, true, "")
}

/// Deletes the selection one key at a time, stopping at the first failure.
pub async fn panel_confirm_batch_delete() -> PanelResponse {
    let mut controller = match lock_panel().await {
        Ok(controller) => controller,
        Err(response) => return response,
    };
    match controller.confirm_batch_delete().await {
        Ok(report) => {
            let (ok, message) = describe_batch(&report);
            PanelResponse::from_controller(&controller, ok, message)
        }
        Err(err) => PanelResponse::from_controller(&controller, false, err.to_string()),
    }
}

pub async fn panel_dismiss_banner() -> PanelResponse {
    let mut controller = match lock_panel().await {
        Ok(controller) => controller,
        Err(response) => return response,
    };
    controller.dismiss_banner();
    PanelResponse::from_controller(&controller, true, "")
}

fn panel() -> Result<&'static Mutex<PanelController>, String> {
    PANEL.get_or_try_init(|| {
        let db_path = resolve_db_path();
        match SqliteMemoryGateway::open(&db_path) {
            Ok(gateway) => {
                info!(
                    "event=panel_init module=ffi status=ok db_path={}",
                    db_path.display()
                );
                Ok(Mutex::new(MemoryController::new(Arc::new(gateway))))
            }
            Err(err) => {
                error!(
                    "event=panel_init module=ffi status=error db_path={} error={err}",
                    db_path.display()
                );
                Err(format!("memory store open failed: {err}"))
            }
        }
    })
}

async fn lock_panel() -> Result<MutexGuard<'static, PanelController>, PanelResponse> {
    match panel() {
        Ok(panel) => Ok(panel.lock().await),
        Err(message) => Err(PanelResponse::unavailable(message)),
    }
}

// The panel lock is not held across the gateway query. `SqliteMemoryGateway`
// answers without yielding, so on a single-threaded executor nothing else
// runs in between; on FRB's worker pool other panel calls may.
async fn run_query(choose: impl FnOnce(&mut PanelController) -> EntryQuery) -> PanelResponse {
    let (ticket, gateway, query) = {
        let mut controller = match lock_panel().await {
            Ok(controller) => controller,
            Err(response) => return response,
        };
        let query = choose(&mut *controller);
        (controller.begin_refresh(), controller.gateway(), query)
    };

    let result = gateway.query(&query).await;

    let mut controller = match lock_panel().await {
        Ok(controller) => controller,
        Err(response) => return response,
    };
    match controller.finish_refresh(ticket, result) {
        QueryResolution::Applied => {
            let count = controller.entries().entries().len();
            PanelResponse::from_controller(&controller, true, format!("Loaded {count} memories."))
        }
        QueryResolution::Failed(message) => {
            PanelResponse::from_controller(&controller, false, message)
        }
        QueryResolution::Stale => {
            PanelResponse::from_controller(&controller, true, "Superseded by a newer search.")
        }
    }
}

fn describe_batch(report: &BatchDeleteReport) -> (bool, String) {
    match &report.failed_at {
        None => (
            true,
            format!("Deleted {} memories.", report.completed.len()),
        ),
        Some(err) => (
            false,
            format!(
                "Deleted {} memories, then stopped: {err}",
                report.completed.len()
            ),
        ),
    }
}

fn to_panel_snapshot(snapshot: ControllerSnapshot) -> PanelSnapshot {
    let (phase, fatal_error, load_banner) = match snapshot.phase {
        LoadPhase::Loading => ("loading", None, None),
        LoadPhase::Failed { message } => ("failed", Some(message), None),
        LoadPhase::Ready { banner } => ("ready", None, banner),
    };

    PanelSnapshot {
        phase: phase.to_string(),
        fatal_error,
        load_banner,
        loading: snapshot.loading,
        entries: snapshot
            .rows
            .into_iter()
            .map(|row| PanelEntry {
                id: row.id,
                key: row.key,
                preview: row.preview,
                content: row.content,
                category: row.category,
                timestamp: row.timestamp,
                selected: row.selected,
                delete_armed: row.delete_armed,
            })
            .collect(),
        search_text: snapshot.search_text,
        category_filter: snapshot.category_filter,
        categories: snapshot.categories,
        selected_keys: snapshot.selected_keys,
        all_selected: snapshot.all_selected,
        form_open: snapshot.draft.open,
        draft_key: snapshot.draft.key,
        draft_content: snapshot.draft.content,
        draft_category: snapshot.draft.category,
        submitting: snapshot.draft.submitting,
        form_error: snapshot.draft.form_error,
        armed_delete_key: snapshot.armed_delete_key,
        batch_delete_armed: snapshot.batch_delete_armed,
        action_banner: snapshot.banner,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, describe_batch, init_logging, panel_confirm_batch_delete,
        panel_confirm_delete, panel_load, panel_open_form, panel_request_batch_delete,
        panel_request_delete, panel_search, panel_set_filters, panel_submit_form,
        panel_toggle_select_all, panel_update_draft, ping, to_panel_snapshot,
    };
    use memdesk_core::config::DB_PATH_ENV;
    use memdesk_core::state::draft::CreateDraft;
    use memdesk_core::{BatchDeleteReport, ControllerSnapshot, DeleteError, LoadPhase};
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        assert!(!init_logging("verbose".to_string(), "/tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn failed_phase_maps_to_fatal_error() {
        let snapshot = ControllerSnapshot {
            phase: LoadPhase::Failed {
                message: "offline".to_string(),
            },
            loading: false,
            rows: Vec::new(),
            search_text: String::new(),
            category_filter: String::new(),
            categories: Vec::new(),
            selected_keys: Vec::new(),
            all_selected: false,
            draft: CreateDraft::default(),
            armed_delete_key: None,
            batch_delete_armed: false,
            banner: None,
        };
        let flat = to_panel_snapshot(snapshot);
        assert_eq!(flat.phase, "failed");
        assert_eq!(flat.fatal_error.as_deref(), Some("offline"));
        assert_eq!(flat.load_banner, None);
    }

    #[test]
    fn describe_batch_names_the_failing_key() {
        let report = BatchDeleteReport {
            completed: vec!["a".to_string()],
            failed_at: Some(DeleteError::NotDeleted("b".to_string())),
        };
        let (ok, message) = describe_batch(&report);
        assert!(!ok);
        assert!(message.contains("`b`"));
    }

    #[tokio::test]
    async fn panel_flow_creates_searches_and_batch_deletes() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        let db_path = std::env::temp_dir().join(format!("memdesk-ffi-{nanos}.sqlite3"));
        std::env::set_var(DB_PATH_ENV, &db_path);

        let loaded = panel_load().await;
        assert!(loaded.ok, "{}", loaded.message);
        assert_eq!(loaded.snapshot.phase, "ready");

        let token = format!("ffi_{nanos}");
        for suffix in ["one", "two"] {
            panel_open_form().await;
            panel_update_draft(
                format!("{token}_{suffix}"),
                "content".to_string(),
                "ffi".to_string(),
            )
            .await;
            let saved = panel_submit_form().await;
            assert!(saved.ok, "{}", saved.message);
            assert!(!saved.snapshot.form_open);
        }

        panel_set_filters(token.clone(), "ffi".to_string()).await;
        let found = panel_search().await;
        assert!(found.ok, "{}", found.message);
        assert_eq!(found.snapshot.entries.len(), 2);
        assert_eq!(found.snapshot.categories, vec!["ffi".to_string()]);

        let armed = panel_request_delete(format!("{token}_one")).await;
        assert_eq!(
            armed.snapshot.armed_delete_key.as_deref(),
            Some(format!("{token}_one").as_str())
        );
        let deleted = panel_confirm_delete(format!("{token}_one")).await;
        assert!(deleted.ok, "{}", deleted.message);
        assert_eq!(deleted.snapshot.entries.len(), 1);

        let selected = panel_toggle_select_all().await;
        assert!(selected.snapshot.all_selected);
        assert!(panel_request_batch_delete().await.ok);
        let batch = panel_confirm_batch_delete().await;
        assert!(batch.ok, "{}", batch.message);
        assert!(batch.snapshot.entries.is_empty());
        assert!(batch.snapshot.selected_keys.is_empty());
    }
}
