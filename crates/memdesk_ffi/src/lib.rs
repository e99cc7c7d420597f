//! FFI bridge crate exposing the memory panel to Flutter.

pub mod api;
