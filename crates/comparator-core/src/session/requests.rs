use serde::{Deserialize, Serialize};

use crate::error::{ComparatorError, Result};

/// Proof that a load was requested, handed back when its response arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadTicket {
    generation: u64,
    target: String,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// What was requested (post id or URL).
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Decides whether a response still corresponds to the latest request.
///
/// Every new request, and every slot change made in between, bumps the
/// generation. A response is applied only when its ticket carries the
/// current generation.
#[derive(Debug, Default)]
pub struct RequestTracker {
    generation: u64,
    in_flight: Option<u64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, target: impl Into<String>) -> LoadTicket {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        LoadTicket {
            generation: self.generation,
            target: target.into(),
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.in_flight == Some(ticket.generation)
    }

    /// Settles a ticket. Stale tickets are rejected.
    pub fn finish(&mut self, ticket: &LoadTicket) -> Result<()> {
        if !self.is_current(ticket) {
            tracing::warn!(
                "[RequestTracker] Discarding stale response for '{}' (generation {}, current {})",
                ticket.target,
                ticket.generation,
                self.generation
            );
            return Err(ComparatorError::Stale(ticket.target.clone()));
        }
        self.in_flight = None;
        Ok(())
    }

    /// Supersedes whatever is in flight.
    pub fn invalidate(&mut self) {
        if self.in_flight.take().is_some() {
            tracing::debug!("[RequestTracker] Pending load superseded");
        }
        self.generation += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }
}
