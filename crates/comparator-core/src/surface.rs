//! Presentation collaborator.
//!
//! The comparator never touches the page directly. Everything it shows goes
//! through a `ComparisonSurface` implemented by the embedding UI, which makes
//! the whole engine drivable from tests with a recording surface.

use serde::{Deserialize, Serialize};

use crate::mode::{ComparisonMode, DifferenceBackground, FilterSettings};
use crate::related::CandidateList;
use crate::slot::{ImageSlot, Slot};
use crate::transform::RenderInstruction;
use crate::viewport::PanZoomController;

/// Which viewport a pan/zoom controller drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportRole {
    Left,
    Right,
    Overlay,
}

/// The two rendering topologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// Two half-width panes separated by a divider.
    Split,
    /// One full-width pane with both images stacked.
    Overlay,
}

/// Every element an image can be rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageElement {
    SplitLeft,
    SplitRight,
    /// Left image cloned into the overlay, underneath.
    OverlayBase,
    /// Right image cloned into the overlay, on top. Receives compositing.
    OverlayTop,
}

impl ImageElement {
    pub fn for_slot(slot: Slot) -> &'static [ImageElement] {
        match slot {
            Slot::Left => &[ImageElement::SplitLeft, ImageElement::OverlayBase],
            Slot::Right => &[ImageElement::SplitRight, ImageElement::OverlayTop],
        }
    }

    pub fn slot(self) -> Slot {
        match self {
            ImageElement::SplitLeft | ImageElement::OverlayBase => Slot::Left,
            ImageElement::SplitRight | ImageElement::OverlayTop => Slot::Right,
        }
    }
}

/// Input event streams the comparator listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSource {
    /// Document-level key presses (Escape closes the panel).
    Keydown,
    /// Wheel events over a viewport, forwarded to its controller.
    Wheel(ViewportRole),
    /// Pan/zoom geometry changes emitted by a controller.
    GeometryChange(ViewportRole),
    SliderHandlePointerDown,
    ContainerPointerDown,
    ContainerPointerMove,
    DocumentPointerUp,
}

/// Handle returned by `ComparisonSurface::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

/// Pixel size of the shared comparison region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentSize {
    pub width: f64,
    pub height: f64,
}

impl ContentSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Bounding boxes the slider needs to translate a cursor into image space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderGeometry {
    pub container_left: f64,
    pub container_width: f64,
    /// Left edge of the on-screen (scaled, panned) top image.
    pub image_left: f64,
}

/// Clip applied to the top image, in the element's own pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipInset {
    pub left: f64,
    pub right: f64,
}

impl ClipInset {
    pub fn css(&self) -> String {
        format!("inset(0 {}px 0 {}px)", self.right, self.left)
    }
}

/// How the top image is combined with the base image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Compositing {
    /// No compositing (side-by-side, or an overlay without a top image).
    None,
    /// Slider: the top image is clipped by the draggable boundary.
    Clip(ClipInset),
    /// Fade: the top image at the given opacity (0.0 ..= 1.0).
    Opacity(f64),
    /// Difference blend against a background color.
    Difference {
        background: DifferenceBackground,
        inverted: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// The overlay panel as seen by the comparator.
///
/// Implementations are expected to ignore operations on elements that are
/// not currently part of the rendered topology.
pub trait ComparisonSurface: Send {
    /// Size of the comparison region.
    fn content_size(&self) -> ContentSize;

    /// Natural size of the decoded reference (left) image, if decoded yet.
    fn reference_natural_size(&self) -> Option<(u32, u32)>;

    /// Current slider bounding boxes, `None` when the overlay is not laid out.
    fn slider_geometry(&self) -> Option<SliderGeometry>;

    /// Shows exactly one topology's subtree and hides the other.
    fn show_topology(&mut self, topology: Topology);

    /// Creates the overlay clones of both slots.
    fn build_overlay(&mut self, left: &ImageSlot, right: &ImageSlot);

    /// Removes the overlay clones and any compositing left on them.
    fn clear_overlay(&mut self);

    fn set_image_source(&mut self, element: ImageElement, slot: &ImageSlot);

    fn set_image_transform(&mut self, element: ImageElement, instruction: &RenderInstruction);

    fn set_compositing(&mut self, compositing: &Compositing);

    /// Moves the slider handle, or hides it with `None`.
    fn set_slider_handle(&mut self, position: Option<f64>);

    fn set_filters(&mut self, filters: &FilterSettings);

    /// Creates a pan/zoom controller bound to the given viewport.
    fn create_controller(&mut self, role: ViewportRole) -> Box<dyn PanZoomController>;

    fn subscribe(&mut self, source: EventSource) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId);

    /// Asks the host to call back into the session once layout is committed.
    fn request_next_tick(&mut self);

    fn notify(&mut self, notice: Notice);

    fn set_info(&mut self, text: &str);

    fn set_mode_selector(&mut self, mode: ComparisonMode);

    fn set_candidates(&mut self, candidates: &CandidateList);
}
