//! Application layer for the booru comparator.
//!
//! Wires the session aggregate to site adapters, the asset probe and the
//! preference store, and runs the asynchronous parts (candidate resolution,
//! image loading) without holding the session across awaits.

pub mod comparator_service;
pub mod telemetry;

pub use comparator_service::{ComparatorService, LoadOutcome};
pub use telemetry::init_tracing;
