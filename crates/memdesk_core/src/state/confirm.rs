//! Armed delete confirmations.
//!
//! At most one single-delete key is armed at a time; the batch flag is
//! independent of it.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteConfirmation {
    armed_key: Option<String>,
    batch_armed: bool,
}

impl DeleteConfirmation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `key`, replacing any previously armed key.
    pub fn arm(&mut self, key: impl Into<String>) {
        self.armed_key = Some(key.into());
    }

    pub fn disarm(&mut self) {
        self.armed_key = None;
    }

    pub fn armed_key(&self) -> Option<&str> {
        self.armed_key.as_deref()
    }

    pub fn is_armed(&self, key: &str) -> bool {
        self.armed_key.as_deref() == Some(key)
    }

    pub fn arm_batch(&mut self) {
        self.batch_armed = true;
    }

    pub fn disarm_batch(&mut self) {
        self.batch_armed = false;
    }

    pub fn batch_armed(&self) -> bool {
        self.batch_armed
    }
}
