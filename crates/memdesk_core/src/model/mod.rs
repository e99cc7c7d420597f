//! Memory entry data model shared by the gateway boundary and controller state.
//!
//! # Responsibility
//! - Define the record returned by the remote memory store.
//! - Define request shapes sent across the gateway boundary.
//!
//! # Invariants
//! - `Entry::key` is the identity used for selection and deletion.
//! - `Entry::id` is a rendering identifier only.

pub mod entry;
