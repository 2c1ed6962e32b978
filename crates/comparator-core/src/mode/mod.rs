//! Comparison modes and their per-mode settings.
//!
//! # Module Structure
//!
//! - `ComparisonMode`: the four topologies/compositing rules
//! - `OverlaySettings`, `DifferenceBackground`, `FilterSettings`: user-adjustable
//!   values consulted while rendering overlay modes
//! - `machine`: `ModeStateMachine`, the transition orchestrator
//! - `slider`: `SliderController`, the draggable reveal boundary

mod machine;
mod slider;

pub use machine::{ModeContext, ModeStateMachine};
pub use slider::SliderController;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::surface::{EventSource, Topology, ViewportRole};

/// Active comparison layout.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ComparisonMode {
    #[default]
    SideBySide,
    Slider,
    Fade,
    Difference,
}

impl ComparisonMode {
    /// Whether both images are rendered coincidentally in one region.
    pub fn is_overlay(self) -> bool {
        !matches!(self, ComparisonMode::SideBySide)
    }

    pub fn topology(self) -> Topology {
        if self.is_overlay() {
            Topology::Overlay
        } else {
            Topology::Split
        }
    }

    /// Label shown in the mode selector.
    pub fn label(self) -> &'static str {
        match self {
            ComparisonMode::SideBySide => "Side by Side",
            ComparisonMode::Slider => "Slider",
            ComparisonMode::Fade => "Fade",
            ComparisonMode::Difference => "Difference",
        }
    }

    /// Parses a persisted value, falling back to side-by-side for anything unknown.
    pub fn from_persisted(value: Option<&str>) -> ComparisonMode {
        value
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_default()
    }

    /// Pan/zoom controllers that must be live while this mode is active.
    pub fn required_controllers(self) -> &'static [ViewportRole] {
        if self.is_overlay() {
            &[ViewportRole::Overlay]
        } else {
            &[ViewportRole::Left, ViewportRole::Right]
        }
    }

    /// Event subscriptions that must be live while this mode is active.
    pub fn required_sources(self) -> Vec<EventSource> {
        match self {
            ComparisonMode::SideBySide => vec![
                EventSource::GeometryChange(ViewportRole::Left),
                EventSource::GeometryChange(ViewportRole::Right),
                EventSource::Wheel(ViewportRole::Left),
                EventSource::Wheel(ViewportRole::Right),
            ],
            ComparisonMode::Slider => vec![
                EventSource::Wheel(ViewportRole::Overlay),
                EventSource::GeometryChange(ViewportRole::Overlay),
                EventSource::SliderHandlePointerDown,
                EventSource::ContainerPointerDown,
                EventSource::ContainerPointerMove,
                EventSource::DocumentPointerUp,
            ],
            ComparisonMode::Fade | ComparisonMode::Difference => {
                vec![EventSource::Wheel(ViewportRole::Overlay)]
            }
        }
    }
}

/// Background the difference blend is composited against.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DifferenceBackground {
    #[default]
    Black,
    Grey,
    White,
}

impl DifferenceBackground {
    pub fn hex(self) -> &'static str {
        match self {
            DifferenceBackground::Black => "#000000",
            DifferenceBackground::Grey => "#808080",
            DifferenceBackground::White => "#ffffff",
        }
    }
}

/// Brightness / saturation applied to the overlay viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    pub brightness: f64,
    pub saturate: f64,
}

impl FilterSettings {
    pub fn new(brightness: f64, saturate: f64) -> Self {
        Self {
            brightness: sanitize_filter(brightness),
            saturate: sanitize_filter(saturate),
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// CSS `filter` value.
    pub fn css(&self) -> String {
        format!("brightness({}) saturate({})", self.brightness, self.saturate)
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            saturate: 1.0,
        }
    }
}

fn sanitize_filter(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 1.0 }
}

/// Overlay compositing parameters that outlive a single mode activation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// Fade opacity of the top image, in percent.
    pub opacity: u8,
    pub background: DifferenceBackground,
    pub inverted: bool,
}

impl OverlaySettings {
    pub fn with_opacity(opacity: u8) -> Self {
        Self {
            opacity: opacity.min(100),
            ..Self::default()
        }
    }

    pub fn opacity_fraction(&self) -> f64 {
        f64::from(self.opacity.min(100)) / 100.0
    }

    /// Label next to the opacity slider.
    pub fn opacity_label(&self) -> String {
        format!("{}%", self.opacity)
    }
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            opacity: 50,
            background: DifferenceBackground::Black,
            inverted: false,
        }
    }
}
