//! Create-entry form draft and client-side validation.
//!
//! # Responsibility
//! - Hold the editable key/content/category fields of the create form.
//! - Validate and trim them into a `NewEntry` before any network call.
//!
//! # Invariants
//! - `submitting` is false whenever control returns to the operator.
//! - A failed submit keeps the fields so the operator can retry.

use crate::model::entry::{non_blank, NewEntry};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Pre-network validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftValidationError {
    EmptyKey,
    EmptyContent,
}

impl Display for DraftValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "key is required"),
            Self::EmptyContent => write!(f, "content is required"),
        }
    }
}

impl Error for DraftValidationError {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateDraft {
    pub open: bool,
    pub key: String,
    pub content: String,
    pub category: String,
    pub submitting: bool,
    pub form_error: Option<String>,
}

impl CreateDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closes the form and discards every field.
    pub fn discard(&mut self) {
        *self = Self::default();
    }

    pub fn set_key(&mut self, value: impl Into<String>) {
        self.key = value.into();
    }

    pub fn set_content(&mut self, value: impl Into<String>) {
        self.content = value.into();
    }

    pub fn set_category(&mut self, value: impl Into<String>) {
        self.category = value.into();
    }

    /// Trims the fields into a create request.
    pub fn validate(&self) -> Result<NewEntry, DraftValidationError> {
        let key = non_blank(&self.key).ok_or(DraftValidationError::EmptyKey)?;
        let content = non_blank(&self.content).ok_or(DraftValidationError::EmptyContent)?;
        Ok(NewEntry {
            key,
            content,
            category: non_blank(&self.category),
        })
    }

    /// Records a rejected or failed submit; fields stay intact.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.submitting = false;
        self.form_error = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::{CreateDraft, DraftValidationError};

    #[test]
    fn validate_trims_and_drops_blank_category() {
        let mut draft = CreateDraft::new();
        draft.set_key("  user_pref ");
        draft.set_content("\tdark mode\n");
        draft.set_category("   ");

        let request = draft.validate().expect("draft should validate");
        assert_eq!(request.key, "user_pref");
        assert_eq!(request.content, "dark mode");
        assert_eq!(request.category, None);
    }

    #[test]
    fn validate_rejects_whitespace_key_before_content() {
        let mut draft = CreateDraft::new();
        draft.set_key("  ");
        assert_eq!(draft.validate(), Err(DraftValidationError::EmptyKey));

        draft.set_key("k");
        assert_eq!(draft.validate(), Err(DraftValidationError::EmptyContent));
    }

    #[test]
    fn discard_resets_everything() {
        let mut draft = CreateDraft::new();
        draft.open();
        draft.set_key("k");
        draft.fail("duplicate");
        draft.discard();
        assert_eq!(draft, CreateDraft::default());
    }
}
