use super::model::ViewportState;
use crate::mode::ComparisonMode;
use crate::slot::Dimensions;
use crate::surface::ContentSize;

/// Width consumed by the side-by-side divider, in pixels.
pub const DEFAULT_DIVIDER_WIDTH: f64 = 4.0;

/// Lower bound for a corrected scale.
pub const MIN_SCALE: f64 = 0.1;

/// Intrinsic aspect ratio of the reference image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageAspect {
    /// Width / height of the decoded image.
    Known(f64),
    /// The image has not been decoded yet.
    Unknown,
}

impl ImageAspect {
    pub fn from_natural(size: Option<(u32, u32)>) -> Self {
        size.and_then(|(width, height)| Dimensions::new(width, height).aspect())
            .map_or(ImageAspect::Unknown, ImageAspect::Known)
    }

    pub fn from_dimensions(dimensions: Option<Dimensions>) -> Self {
        dimensions
            .and_then(|d| d.aspect())
            .map_or(ImageAspect::Unknown, ImageAspect::Known)
    }
}

/// Corrects scale and vertical pan when the topology changes, so the image
/// keeps its apparent on-screen size.
///
/// Switching from two half-width panes to one full-width pane makes the
/// layout refit the image into a differently shaped box; the height ratio
/// between both fits is exactly the factor the user-visible zoom must absorb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransitionCalculator {
    pub divider_width: f64,
    pub min_scale: f64,
}

impl Default for ZoomTransitionCalculator {
    fn default() -> Self {
        Self {
            divider_width: DEFAULT_DIVIDER_WIDTH,
            min_scale: MIN_SCALE,
        }
    }
}

impl ZoomTransitionCalculator {
    pub fn new(divider_width: f64, min_scale: f64) -> Self {
        Self {
            divider_width,
            min_scale,
        }
    }

    pub fn side_width(&self, content: ContentSize) -> f64 {
        (content.width - self.divider_width) / 2.0
    }

    /// Height of an image fitted (contain) into a container.
    pub fn display_height(container_width: f64, container_height: f64, image_aspect: f64) -> f64 {
        let container_aspect = container_width / container_height;
        if image_aspect > container_aspect {
            container_width / image_aspect
        } else {
            container_height
        }
    }

    /// Factor to multiply the scale by when going from `from` to `to`.
    ///
    /// Returns 1 when the topology is unchanged or the geometry is unknown.
    pub fn height_ratio(
        &self,
        from: ComparisonMode,
        to: ComparisonMode,
        content: ContentSize,
        aspect: ImageAspect,
    ) -> f64 {
        if from.is_overlay() == to.is_overlay() {
            return 1.0;
        }
        let ImageAspect::Known(aspect) = aspect else {
            return 1.0;
        };
        if !content.is_valid() || !aspect.is_finite() || aspect <= 0.0 {
            return 1.0;
        }
        let side_width = self.side_width(content);
        if side_width <= 0.0 {
            return 1.0;
        }

        let side_by_side_height = Self::display_height(side_width, content.height, aspect);
        let overlay_height = Self::display_height(content.width, content.height, aspect);

        if to.is_overlay() {
            side_by_side_height / overlay_height
        } else {
            overlay_height / side_by_side_height
        }
    }

    /// Re-projects captured geometry into the target topology.
    pub fn remap(
        &self,
        state: ViewportState,
        from: ComparisonMode,
        to: ComparisonMode,
        content: ContentSize,
        aspect: ImageAspect,
    ) -> ViewportState {
        let ratio = self.height_ratio(from, to, content, aspect);
        if ratio == 1.0 || !ratio.is_finite() || ratio <= 0.0 {
            return state;
        }
        let scale = (state.scale() * ratio).max(self.min_scale);
        let y = state.y() * ratio;
        tracing::debug!(
            "[ZoomTransitionCalculator] {:?} -> {:?}: ratio={:.4} scale {:.4} -> {:.4}",
            from,
            to,
            ratio,
            state.scale(),
            scale
        );
        ViewportState::new(scale, state.x(), y).unwrap_or(state)
    }
}
