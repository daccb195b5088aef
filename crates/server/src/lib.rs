//! HTTP surface for rallypoint.
//!
//! Exposed as a library so integration tests can build the router
//! in-process; the `rally` binary in `main.rs` is a thin wrapper.

pub mod api;
pub mod metrics;
pub mod state;
