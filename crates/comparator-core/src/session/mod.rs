//! The comparison session aggregate.
//!
//! # Module Structure
//!
//! - `model`: `ComparisonSession`, the composition root of one open panel
//! - `requests`: `RequestTracker` / `LoadTicket`, the stale-response guard for loads

mod model;
mod requests;

pub use model::{CLOSE_KEY, ComparisonSession};
pub use requests::{LoadTicket, RequestTracker};
