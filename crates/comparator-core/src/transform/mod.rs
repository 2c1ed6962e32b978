//! Per-slot geometric transforms (flip / rotate) and their rendering.
//!
//! # Module Structure
//!
//! - `model`: `Rotation`, `TransformState`, `TransformOp`
//! - `pipeline`: pure mapping from a `TransformState` to a `RenderInstruction`

mod model;
mod pipeline;

pub use model::{Rotation, TransformOp, TransformState};
pub use pipeline::{RenderInstruction, TransformPipeline};
