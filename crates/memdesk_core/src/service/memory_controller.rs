//! Memory panel controller.
//!
//! # Responsibility
//! - Own every piece of panel state and funnel all mutation through named
//!   operations.
//! - Orchestrate gateway queries and creates against that state.
//!
//! # Invariants
//! - `selection ⊆ keys(entries)` after every operation.
//! - Filter drafts reach the gateway only through `commit_filters`.
//! - A successful create re-queries with the committed filters, not the drafts.
//! - Gateway failures are stored as messages, never dropped.
//!
//! # See also
//! - `service::delete_coordinator` for single and batch deletes.

use crate::gateway::{GatewayError, GatewayResult, MemoryGateway};
use crate::model::entry::{Entry, EntryQuery};
use crate::service::snapshot::{ControllerSnapshot, EntryRow};
use crate::state::confirm::DeleteConfirmation;
use crate::state::draft::{CreateDraft, DraftValidationError};
use crate::state::entries::{EntryCollection, LoadPhase, QueryResolution, QueryTicket};
use crate::state::filter::FilterState;
use crate::state::selection::SelectionSet;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Failure of `MemoryController::submit_create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateEntryError {
    /// Draft failed local validation; the gateway was not called.
    Validation(DraftValidationError),
    /// Gateway rejected or failed the create.
    Gateway(GatewayError),
}

impl Display for CreateEntryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Gateway(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CreateEntryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Gateway(err) => Some(err),
        }
    }
}

impl From<DraftValidationError> for CreateEntryError {
    fn from(value: DraftValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<GatewayError> for CreateEntryError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}

/// Single owner of the memory panel state.
pub struct MemoryController<G: MemoryGateway> {
    pub(super) gateway: Arc<G>,
    pub(super) entries: EntryCollection,
    pub(super) filter: FilterState,
    pub(super) selection: SelectionSet,
    pub(super) draft: CreateDraft,
    pub(super) confirm: DeleteConfirmation,
    pub(super) banner: Option<String>,
}

impl<G: MemoryGateway> MemoryController<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            entries: EntryCollection::new(),
            filter: FilterState::new(),
            selection: SelectionSet::new(),
            draft: CreateDraft::new(),
            confirm: DeleteConfirmation::new(),
            banner: None,
        }
    }

    /// Shared handle to the gateway, for hosts that run queries themselves.
    pub fn gateway(&self) -> Arc<G> {
        Arc::clone(&self.gateway)
    }

    pub fn entries(&self) -> &EntryCollection {
        &self.entries
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn draft(&self) -> &CreateDraft {
        &self.draft
    }

    pub fn confirmation(&self) -> &DeleteConfirmation {
        &self.confirm
    }

    /// Last mutation failure (delete, batch delete), if not dismissed.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn load_phase(&self) -> LoadPhase {
        self.entries.load_phase()
    }

    // ── Fetch orchestration ──

    /// Initial unfiltered load.
    pub async fn start(&mut self) -> QueryResolution {
        info!("event=controller_start module=controller status=start");
        self.refresh(EntryQuery::unfiltered()).await
    }

    /// Queries the gateway with `query` and applies the result.
    pub async fn refresh(&mut self, query: EntryQuery) -> QueryResolution {
        let ticket = self.begin_refresh();
        let result = self.gateway.query(&query).await;
        self.finish_refresh(ticket, result)
    }

    /// Marks a query as outstanding; pair with `finish_refresh`.
    pub fn begin_refresh(&mut self) -> QueryTicket {
        let ticket = self.entries.begin_query();
        debug!(
            "event=refresh module=controller status=start seq={}",
            ticket.seq()
        );
        ticket
    }

    /// Applies a query result issued under `ticket`, then prunes the selection.
    pub fn finish_refresh(
        &mut self,
        ticket: QueryTicket,
        result: GatewayResult<Vec<Entry>>,
    ) -> QueryResolution {
        let resolution = self
            .entries
            .resolve(ticket, result.map_err(|err| err.message()));

        match &resolution {
            QueryResolution::Applied => {
                let dropped = self.selection.retain_displayed(self.entries.entries());
                self.drop_stale_confirmations();
                info!(
                    "event=refresh module=controller status=ok seq={} count={} pruned={}",
                    ticket.seq(),
                    self.entries.entries().len(),
                    dropped.len()
                );
            }
            QueryResolution::Failed(message) => warn!(
                "event=refresh module=controller status=error seq={} error={}",
                ticket.seq(),
                message
            ),
            QueryResolution::Stale => debug!(
                "event=refresh module=controller status=stale seq={}",
                ticket.seq()
            ),
        }
        resolution
    }

    fn drop_stale_confirmations(&mut self) {
        if let Some(key) = self.confirm.armed_key() {
            if !self.entries.contains_key(key) {
                self.confirm.disarm();
            }
        }
        if self.selection.is_empty() {
            self.confirm.disarm_batch();
        }
    }

    // ── Filters ──

    pub fn set_search_text(&mut self, value: impl Into<String>) {
        self.filter.set_search_text(value);
    }

    pub fn set_category_filter(&mut self, value: impl Into<String>) {
        self.filter.set_category(value);
    }

    /// Search button / Enter: applies the filter drafts.
    pub async fn commit_filters(&mut self) -> QueryResolution {
        let query = self.commit_filter_drafts();
        self.refresh(query).await
    }

    /// Freezes the filter drafts without querying; pair with `begin_refresh`.
    pub fn commit_filter_drafts(&mut self) -> EntryQuery {
        self.filter.commit()
    }

    /// Categories offered by the category filter, derived from loaded entries.
    pub fn categories(&self) -> Vec<String> {
        self.entries.categories()
    }

    // ── Selection ──

    /// Returns whether `key` is selected afterwards.
    pub fn toggle_selection(&mut self, key: &str) -> bool {
        self.selection.toggle(key, self.entries.entries())
    }

    pub fn toggle_select_all(&mut self) {
        self.selection.toggle_all(self.entries.entries());
    }

    // ── Create form ──

    pub fn open_create_form(&mut self) {
        self.draft.open();
    }

    /// Closes the form and throws the draft away.
    pub fn cancel_create_form(&mut self) {
        self.draft.discard();
    }

    pub fn set_draft_key(&mut self, value: impl Into<String>) {
        self.draft.set_key(value);
    }

    pub fn set_draft_content(&mut self, value: impl Into<String>) {
        self.draft.set_content(value);
    }

    pub fn set_draft_category(&mut self, value: impl Into<String>) {
        self.draft.set_category(value);
    }

    /// Validates and submits the draft.
    ///
    /// On success the form closes and the list is re-queried with the
    /// committed filters, so the new entry shows only if it matches them.
    ///
    /// # Errors
    /// - `Validation` when key or content is blank; no gateway call is made.
    /// - `Gateway` when the store rejects the create; the draft is kept.
    pub async fn submit_create(&mut self) -> Result<Entry, CreateEntryError> {
        let request = match self.draft.validate() {
            Ok(request) => request,
            Err(err) => {
                self.draft.fail(err.to_string());
                return Err(err.into());
            }
        };

        self.draft.submitting = true;
        match self.gateway.create(&request).await {
            Ok(entry) => {
                self.draft.discard();
                info!(
                    "event=create module=controller status=ok key={}",
                    entry.key
                );
                let query = self.filter.committed().clone();
                self.refresh(query).await;
                Ok(entry)
            }
            Err(err) => {
                warn!(
                    "event=create module=controller status=error key={} error={}",
                    request.key, err
                );
                self.draft.fail(err.message());
                Err(err.into())
            }
        }
    }

    // ── Presentation ──

    /// Read-only copy of everything the presentation layer renders.
    pub fn snapshot(&self) -> ControllerSnapshot {
        let displayed = self.entries.entries();
        ControllerSnapshot {
            phase: self.entries.load_phase(),
            loading: self.entries.loading(),
            rows: displayed
                .iter()
                .map(|entry| EntryRow {
                    id: entry.id.clone(),
                    key: entry.key.clone(),
                    preview: entry.content_preview(),
                    content: entry.content.clone(),
                    category: entry.category.clone(),
                    timestamp: entry.timestamp.clone(),
                    selected: self.selection.contains(&entry.key),
                    delete_armed: self.confirm.is_armed(&entry.key),
                })
                .collect(),
            search_text: self.filter.search_text().to_string(),
            category_filter: self.filter.category().to_string(),
            categories: self.entries.categories(),
            selected_keys: self.selection.ordered_keys(displayed),
            all_selected: self.selection.is_all_selected(displayed),
            draft: self.draft.clone(),
            armed_delete_key: self.confirm.armed_key().map(str::to_string),
            batch_delete_armed: self.confirm.batch_armed(),
            banner: self.banner.clone(),
        }
    }
}
