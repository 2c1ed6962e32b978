use super::model::ViewportState;

/// Options for applying geometry to a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOptions {
    pub animate: bool,
    /// When set, the controller must not emit a change event.
    pub silent: bool,
}

impl ApplyOptions {
    /// Instantaneous application without change events.
    pub const SILENT: ApplyOptions = ApplyOptions {
        animate: false,
        silent: true,
    };
}

/// A live pan/zoom controller bound to one viewport element.
///
/// The pointer/wheel to zoom mapping lives inside the implementation; the
/// comparator only reads and writes geometry.
pub trait PanZoomController: Send {
    fn geometry(&self) -> ViewportState;

    /// Applies geometry and returns the change event this emitted, if any.
    fn apply(&mut self, state: ViewportState, options: ApplyOptions) -> Option<ViewportState>;

    /// Restores the controller's default framing (fit to container).
    fn reset(&mut self);

    /// Releases the controller. It is dropped right after.
    fn destroy(&mut self);
}
