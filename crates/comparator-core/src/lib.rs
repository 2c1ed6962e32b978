//! Core domain of the booru image comparator.
//!
//! Everything here is synchronous and free of I/O except for the async
//! collaborator traits (`PostBackend`, `RelatedSource`, `SiteAdapter`,
//! `AssetProbe`) that the infrastructure crate implements.

pub mod asset;
pub mod config;
pub mod disposables;
pub mod error;
pub mod host;
pub mod input;
pub mod mode;
pub mod preference;
pub mod related;
pub mod session;
pub mod site;
pub mod slot;
pub mod surface;
pub mod transform;
pub mod viewport;

#[cfg(test)]
mod testing;

// Re-export common types
pub use config::ComparatorConfig;
pub use error::{ComparatorError, ErrorCategory, Result};
pub use input::LoadTarget;
pub use mode::ComparisonMode;
pub use session::ComparisonSession;
pub use slot::{ImageId, ImageSlot, Slot};
