//! Controller services over the memory gateway.
//!
//! # Responsibility
//! - Orchestrate gateway calls into panel-level operations.
//! - Keep the presentation layer decoupled from gateway and storage details.

pub mod delete_coordinator;
pub mod memory_controller;
pub mod snapshot;
