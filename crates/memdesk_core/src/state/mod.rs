//! Local UI state owned by the memory controller.
//!
//! # Responsibility
//! - Hold the entry list, filter drafts, selection, create draft and delete
//!   confirmations as plain state objects.
//! - Expose only named mutators; orchestration lives in `service`.
//!
//! # Invariants
//! - None of these types performs I/O.

pub mod confirm;
pub mod draft;
pub mod entries;
pub mod filter;
pub mod selection;
