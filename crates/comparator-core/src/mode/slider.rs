use crate::surface::{ClipInset, SliderGeometry};

/// Draggable reveal boundary used in slider mode.
///
/// Only holds the cursor position (relative to the overlay container) and the
/// drag flag; the clip itself is recomputed from live geometry every time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SliderController {
    cursor_x: Option<f64>,
    dragging: bool,
}

impl SliderController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor_x(&self) -> Option<f64> {
        self.cursor_x
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_positioned(&self) -> bool {
        self.cursor_x.is_some()
    }

    /// Places the cursor at the middle of the container.
    pub fn center(&mut self, container_width: f64) -> f64 {
        self.set_cursor(container_width / 2.0, container_width)
    }

    /// Moves the cursor, clamped to `[0, container_width]`.
    pub fn set_cursor(&mut self, x: f64, container_width: f64) -> f64 {
        let width = if container_width.is_finite() {
            container_width.max(0.0)
        } else {
            0.0
        };
        let x = if x.is_finite() { x } else { width / 2.0 };
        let clamped = x.clamp(0.0, width);
        self.cursor_x = Some(clamped);
        clamped
    }

    /// Re-clamps the cursor after the container was resized.
    pub fn reclamp(&mut self, container_width: f64) -> Option<f64> {
        let x = self.cursor_x?;
        Some(self.set_cursor(x, container_width))
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// Follows the pointer only while a drag is in progress.
    pub fn drag_to(&mut self, x: f64, container_width: f64) -> Option<f64> {
        if !self.dragging {
            return None;
        }
        Some(self.set_cursor(x, container_width))
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Forgets the cursor and any drag in progress.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Clip for the top image.
    ///
    /// `scale` is the overlay controller's zoom, `None` when no controller is
    /// live. A horizontally flipped top image renders mirrored, so the inset is
    /// moved to the other edge of its own coordinate space.
    pub fn clip(&self, geometry: &SliderGeometry, scale: Option<f64>, mirrored: bool) -> ClipInset {
        let cursor = self
            .cursor_x
            .unwrap_or(geometry.container_width / 2.0)
            .clamp(0.0, geometry.container_width.max(0.0));

        let coordinate = match scale {
            Some(scale) if scale.is_finite() && scale > 0.0 => {
                let relative = cursor - (geometry.image_left - geometry.container_left);
                (relative / scale).max(0.0)
            }
            _ => cursor,
        };

        if mirrored {
            ClipInset {
                left: 0.0,
                right: coordinate,
            }
        } else {
            ClipInset {
                left: coordinate,
                right: 0.0,
            }
        }
    }
}
