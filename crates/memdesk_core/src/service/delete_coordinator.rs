//! Single and batch delete flows of the memory controller.
//!
//! # Responsibility
//! - Two-step (arm, then confirm) deletes for one entry or the selection.
//! - Splice confirmed deletions out of local state without re-querying.
//!
//! # Invariants
//! - Local state changes only after the gateway reports `deleted = true`.
//! - Batch deletes run one key at a time, in display order, and stop at the
//!   first key that is not deleted.
//! - The selection is cleared only when a batch runs to completion.

use crate::gateway::{GatewayError, MemoryGateway};
use crate::model::entry::RemoveOutcome;
use crate::service::memory_controller::MemoryController;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure of a delete operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteError {
    /// `confirm_delete` was called for a key that is not armed.
    NotArmed(String),
    /// `confirm_batch_delete` was called without an armed batch.
    BatchNotArmed,
    /// Gateway answered `deleted = false`; the entry is presumed still present.
    NotDeleted(String),
    Gateway { key: String, source: GatewayError },
}

impl DeleteError {
    /// Key the failure refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::NotArmed(key) | Self::NotDeleted(key) => Some(key.as_str()),
            Self::Gateway { key, .. } => Some(key.as_str()),
            Self::BatchNotArmed => None,
        }
    }
}

impl Display for DeleteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotArmed(key) => write!(f, "delete of `{key}` was not confirmed"),
            Self::BatchNotArmed => write!(f, "batch delete was not confirmed"),
            Self::NotDeleted(key) => write!(f, "memory `{key}` was not deleted"),
            Self::Gateway { key, source } => write!(f, "failed to delete `{key}`: {source}"),
        }
    }
}

impl Error for DeleteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Gateway { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Outcome of one batch delete pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchDeleteReport {
    /// Keys deleted, in the order they were removed.
    pub completed: Vec<String>,
    /// First key that was not deleted; the pass stopped there.
    pub failed_at: Option<DeleteError>,
}

impl BatchDeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed_at.is_none()
    }

    /// Key the pass stopped at.
    pub fn failed_key(&self) -> Option<&str> {
        self.failed_at.as_ref().and_then(DeleteError::key)
    }
}

impl<G: MemoryGateway> MemoryController<G> {
    /// Arms the single-delete confirmation for `key`, disarming any other key.
    ///
    /// Returns `false` (and arms nothing) when `key` is not displayed.
    pub fn request_delete(&mut self, key: &str) -> bool {
        if !self.entries.contains_key(key) {
            return false;
        }
        self.confirm.arm(key);
        true
    }

    pub fn cancel_delete(&mut self) {
        self.confirm.disarm();
    }

    /// Deletes the armed `key`.
    ///
    /// The confirmation is cleared whatever the outcome.
    ///
    /// # Errors
    /// - `NotArmed` when `key` is not the armed key; the gateway is not called.
    /// - `NotDeleted` / `Gateway` when the store did not delete; local state
    ///   is untouched and the failure is shown in the banner.
    pub async fn confirm_delete(&mut self, key: &str) -> Result<(), DeleteError> {
        if !self.confirm.is_armed(key) {
            warn!("event=delete module=delete status=rejected key={key} reason=not_armed");
            return Err(DeleteError::NotArmed(key.to_string()));
        }

        let result = self.remove_one(key).await;
        self.confirm.disarm();
        match result {
            Ok(()) => {
                info!("event=delete module=delete status=ok key={key}");
                Ok(())
            }
            Err(err) => {
                warn!("event=delete module=delete status=error key={key} error={err}");
                self.banner = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Arms the batch confirmation. Returns `false` when nothing is selected.
    pub fn request_batch_delete(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        self.confirm.arm_batch();
        true
    }

    pub fn cancel_batch_delete(&mut self) {
        self.confirm.disarm_batch();
    }

    /// Deletes the selected keys sequentially, stopping at the first failure.
    ///
    /// Keys deleted before a failure are already spliced out; the remaining
    /// keys (the failed one included) stay selected.
    ///
    /// # Errors
    /// `BatchNotArmed` when no batch confirmation is pending. Per-key failures
    /// are reported through `BatchDeleteReport::failed_at`, not as `Err`.
    pub async fn confirm_batch_delete(&mut self) -> Result<BatchDeleteReport, DeleteError> {
        if !self.confirm.batch_armed() {
            warn!("event=batch_delete module=delete status=rejected reason=not_armed");
            return Err(DeleteError::BatchNotArmed);
        }

        let keys = self.selection.ordered_keys(self.entries.entries());
        info!(
            "event=batch_delete module=delete status=start count={}",
            keys.len()
        );

        let mut report = BatchDeleteReport::default();
        for key in keys {
            match self.remove_one(&key).await {
                Ok(()) => report.completed.push(key),
                Err(err) => {
                    report.failed_at = Some(err);
                    break;
                }
            }
        }

        self.confirm.disarm_batch();
        match &report.failed_at {
            None => {
                self.selection.clear();
                info!(
                    "event=batch_delete module=delete status=ok deleted={}",
                    report.completed.len()
                );
            }
            Some(err) => {
                warn!(
                    "event=batch_delete module=delete status=error deleted={} error={err}",
                    report.completed.len()
                );
                self.banner = Some(format!("batch delete stopped: {err}"));
            }
        }
        Ok(report)
    }

    async fn remove_one(&mut self, key: &str) -> Result<(), DeleteError> {
        match self.gateway.remove(key).await {
            Ok(RemoveOutcome { deleted: true }) => {
                self.splice_deleted(key);
                Ok(())
            }
            Ok(RemoveOutcome { deleted: false }) => Err(DeleteError::NotDeleted(key.to_string())),
            Err(source) => Err(DeleteError::Gateway {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn splice_deleted(&mut self, key: &str) {
        self.entries.remove_key(key);
        self.selection.prune([key]);
        if self.confirm.is_armed(key) {
            self.confirm.disarm();
        }
    }
}
