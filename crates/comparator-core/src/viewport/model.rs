use serde::{Deserialize, Serialize};

use crate::error::{ComparatorError, Result};

/// Last known pan/zoom, shared by whichever topology is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawViewportState")]
pub struct ViewportState {
    scale: f64,
    x: f64,
    y: f64,
}

impl ViewportState {
    /// Validated constructor: every component finite, scale strictly positive.
    pub fn new(scale: f64, x: f64, y: f64) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ComparatorError::internal(format!(
                "viewport scale must be finite and > 0, got {}",
                scale
            )));
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(ComparatorError::internal(format!(
                "viewport pan must be finite, got ({}, {})",
                x, y
            )));
        }
        Ok(Self { scale, x, y })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn approx_eq(&self, other: &ViewportState, epsilon: f64) -> bool {
        (self.scale - other.scale).abs() <= epsilon
            && (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
    }
}

#[derive(Deserialize)]
struct RawViewportState {
    scale: f64,
    x: f64,
    y: f64,
}

impl TryFrom<RawViewportState> for ViewportState {
    type Error = ComparatorError;

    fn try_from(raw: RawViewportState) -> Result<Self> {
        Self::new(raw.scale, raw.x, raw.y)
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            x: 0.0,
            y: 0.0,
        }
    }
}
