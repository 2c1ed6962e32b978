//! Pan/zoom geometry.
//!
//! # Module Structure
//!
//! - `model`: `ViewportState` (scale + pan, always finite with scale > 0)
//! - `controller`: the `PanZoomController` seam over the host's pan/zoom primitive
//! - `sync`: `ViewportSyncEngine`, mirroring and restoring live controllers
//! - `transition`: `ZoomTransitionCalculator`, re-projecting geometry across topologies

mod controller;
mod model;
mod sync;
mod transition;

pub use controller::{ApplyOptions, PanZoomController};
pub use model::ViewportState;
pub use sync::ViewportSyncEngine;
pub use transition::{DEFAULT_DIVIDER_WIDTH, ImageAspect, MIN_SCALE, ZoomTransitionCalculator};
