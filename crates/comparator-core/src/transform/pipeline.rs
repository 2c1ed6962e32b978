use serde::Serialize;

use super::model::{Rotation, TransformState};
use crate::slot::{Slot, SlotPair};
use crate::surface::{ComparisonSurface, ImageElement};

/// Presentation-only instruction derived from a `TransformState`.
///
/// Flips and the rotation commute, so the CSS form is a plain
/// concatenation of the individual operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderInstruction {
    pub scale_x: i8,
    pub scale_y: i8,
    pub rotate_deg: u16,
}

impl RenderInstruction {
    pub fn identity() -> Self {
        Self {
            scale_x: 1,
            scale_y: 1,
            rotate_deg: 0,
        }
    }

    /// CSS `transform` value, empty for the identity.
    pub fn css_transform(&self) -> String {
        let mut parts = Vec::new();
        if self.scale_x < 0 {
            parts.push("scaleX(-1)".to_string());
        }
        if self.scale_y < 0 {
            parts.push("scaleY(-1)".to_string());
        }
        if self.rotate_deg != 0 {
            parts.push(format!("rotate({}deg)", self.rotate_deg));
        }
        parts.join(" ")
    }

    /// Class names for stylesheets that express the transform with classes.
    pub fn class_names(&self) -> Vec<&'static str> {
        let mut classes = Vec::new();
        if self.scale_x < 0 {
            classes.push("flip-h");
        }
        if self.scale_y < 0 {
            classes.push("flip-v");
        }
        match self.rotate_deg {
            90 => classes.push("rotate-90"),
            180 => classes.push("rotate-180"),
            270 => classes.push("rotate-270"),
            _ => {}
        }
        classes
    }

    pub fn is_mirrored_horizontally(&self) -> bool {
        self.scale_x < 0
    }
}

/// Maps transform state to rendering instructions and paints them.
pub struct TransformPipeline;

impl TransformPipeline {
    /// Pure mapping; never touches image data.
    pub fn apply(state: &TransformState) -> RenderInstruction {
        RenderInstruction {
            scale_x: if state.flip_h { -1 } else { 1 },
            scale_y: if state.flip_v { -1 } else { 1 },
            rotate_deg: match state.rotation {
                Rotation::Deg0 => 0,
                Rotation::Deg90 => 90,
                Rotation::Deg180 => 180,
                Rotation::Deg270 => 270,
            },
        }
    }

    /// Paints one slot's transform onto every element that renders it.
    pub fn paint_slot(surface: &mut dyn ComparisonSurface, slot: Slot, state: &TransformState) {
        let instruction = Self::apply(state);
        for element in ImageElement::for_slot(slot) {
            surface.set_image_transform(*element, &instruction);
        }
    }

    /// Paints both slots.
    pub fn paint(surface: &mut dyn ComparisonSurface, transforms: &SlotPair<TransformState>) {
        for slot in Slot::BOTH {
            Self::paint_slot(surface, slot, transforms.get(slot));
        }
    }
}
