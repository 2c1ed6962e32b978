use super::{ComparisonMode, FilterSettings, OverlaySettings, SliderController};
use crate::disposables::{DisposableArena, Scope};
use crate::slot::{ImageSlot, Slot, SlotPair};
use crate::surface::{
    ComparisonSurface, Compositing, ImageElement, SliderGeometry, Topology, ViewportRole,
};
use crate::transform::{TransformPipeline, TransformState};
use crate::viewport::{ImageAspect, ViewportState, ViewportSyncEngine, ZoomTransitionCalculator};

/// Borrowed view of the session state a mode transition touches.
pub struct ModeContext<'a> {
    pub surface: &'a mut dyn ComparisonSurface,
    pub viewports: &'a mut ViewportSyncEngine,
    pub disposables: &'a mut DisposableArena,
    pub slots: &'a SlotPair<ImageSlot>,
    pub transforms: &'a SlotPair<TransformState>,
    pub overlay: &'a mut OverlaySettings,
    pub filters: &'a FilterSettings,
    pub viewport: &'a mut ViewportState,
}

impl ModeContext<'_> {
    fn has_comparand(&self) -> bool {
        !self.slots.right.is_empty()
    }

    fn reference_aspect(&self) -> ImageAspect {
        match ImageAspect::from_natural(self.surface.reference_natural_size()) {
            ImageAspect::Unknown => ImageAspect::from_dimensions(self.slots.left.dimensions),
            known => known,
        }
    }
}

/// Owns the active mode and performs transitions between modes.
///
/// A transition captures the live geometry, releases every mode-scoped
/// resource, re-projects the geometry when the topology flips, renders the
/// new topology and schedules the geometry restore for the next tick.
#[derive(Debug, Clone)]
pub struct ModeStateMachine {
    mode: ComparisonMode,
    calculator: ZoomTransitionCalculator,
    slider: SliderController,
    /// The slider is positioned once the overlay has layout.
    slider_pending: bool,
}

impl ModeStateMachine {
    pub fn new(calculator: ZoomTransitionCalculator) -> Self {
        Self {
            mode: ComparisonMode::default(),
            calculator,
            slider: SliderController::new(),
            slider_pending: false,
        }
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    pub fn slider(&self) -> &SliderController {
        &self.slider
    }

    pub fn calculator(&self) -> &ZoomTransitionCalculator {
        &self.calculator
    }

    /// First render of a freshly opened session. No geometry is remapped.
    pub fn start(&mut self, mode: ComparisonMode, ctx: &mut ModeContext<'_>) {
        tracing::debug!("[ModeStateMachine] Starting in {}", mode);
        self.teardown(ctx);
        self.mode = mode;
        self.render(ctx);
    }

    /// Switches to `new_mode`. Re-entering the active mode re-renders it.
    pub fn set_mode(&mut self, new_mode: ComparisonMode, ctx: &mut ModeContext<'_>) {
        let previous = self.mode;

        if let Some(state) = ctx.viewports.capture() {
            *ctx.viewport = state;
        }

        self.teardown(ctx);

        if previous.is_overlay() != new_mode.is_overlay() {
            *ctx.viewport = self.calculator.remap(
                *ctx.viewport,
                previous,
                new_mode,
                ctx.surface.content_size(),
                ctx.reference_aspect(),
            );
        }

        if previous != new_mode {
            tracing::debug!("[ModeStateMachine] {} -> {}", previous, new_mode);
        }
        self.mode = new_mode;
        self.render(ctx);
    }

    /// Re-renders the active mode, keeping the current geometry.
    pub fn rerender(&mut self, ctx: &mut ModeContext<'_>) {
        self.set_mode(self.mode, ctx);
    }

    /// Releases everything the active mode set up. Safe to call repeatedly.
    pub fn teardown(&mut self, ctx: &mut ModeContext<'_>) {
        ctx.disposables
            .drain(Scope::Mode, &mut *ctx.surface, &mut *ctx.viewports);
        self.slider.clear();
        self.slider_pending = false;
        ctx.surface.set_slider_handle(None);
        ctx.surface.set_compositing(&Compositing::None);
        ctx.surface.clear_overlay();
    }

    fn render(&mut self, ctx: &mut ModeContext<'_>) {
        let mode = self.mode;
        ctx.surface.show_topology(mode.topology());
        ctx.surface.set_mode_selector(mode);

        ctx.surface
            .set_image_source(ImageElement::SplitLeft, &ctx.slots.left);
        ctx.surface
            .set_image_source(ImageElement::SplitRight, &ctx.slots.right);

        if mode.topology() == Topology::Overlay {
            ctx.surface.build_overlay(&ctx.slots.left, &ctx.slots.right);
            ctx.surface.set_filters(ctx.filters);
        }

        for role in mode.required_controllers() {
            ctx.disposables.attach_controller(
                Scope::Mode,
                &mut *ctx.surface,
                &mut *ctx.viewports,
                *role,
            );
        }
        if !mode.is_overlay() {
            ctx.viewports.sync(ViewportRole::Left, ViewportRole::Right);
        }
        for source in mode.required_sources() {
            ctx.disposables
                .subscribe(Scope::Mode, &mut *ctx.surface, source);
        }

        if mode == ComparisonMode::Difference {
            ctx.overlay.background = Default::default();
            ctx.overlay.inverted = false;
        }
        self.slider_pending = mode == ComparisonMode::Slider && ctx.has_comparand();
        self.apply_compositing(ctx);

        // New controllers have no layout yet; the restore waits for the next tick.
        ctx.viewports.schedule_restore(*ctx.viewport);
        ctx.surface.request_next_tick();

        TransformPipeline::paint(&mut *ctx.surface, ctx.transforms);
    }

    /// Pushes the compositing rule of the active mode to the surface.
    pub fn apply_compositing(&mut self, ctx: &mut ModeContext<'_>) {
        if !ctx.has_comparand() {
            ctx.surface.set_compositing(&Compositing::None);
            return;
        }
        let compositing = match self.mode {
            ComparisonMode::SideBySide => Compositing::None,
            ComparisonMode::Fade => Compositing::Opacity(ctx.overlay.opacity_fraction()),
            ComparisonMode::Difference => Compositing::Difference {
                background: ctx.overlay.background,
                inverted: ctx.overlay.inverted,
            },
            ComparisonMode::Slider => {
                self.refresh_slider(ctx);
                return;
            }
        };
        ctx.surface.set_compositing(&compositing);
    }

    /// Work that needs committed layout: geometry restore and slider placement.
    pub fn on_next_tick(&mut self, ctx: &mut ModeContext<'_>) -> bool {
        let restored = ctx.viewports.flush_restore().is_some();

        if self.slider_pending {
            self.slider_pending = false;
            match ctx.surface.slider_geometry() {
                Some(geometry) => {
                    self.slider.center(geometry.container_width);
                    self.refresh_slider(ctx);
                }
                None => tracing::debug!("[ModeStateMachine] Slider container has no layout yet"),
            }
        }
        restored
    }

    /// Recomputes the slider clip from the live overlay geometry.
    pub fn refresh_slider(&mut self, ctx: &mut ModeContext<'_>) {
        if self.mode != ComparisonMode::Slider || !ctx.has_comparand() {
            return;
        }
        let Some(geometry) = ctx.surface.slider_geometry() else {
            return;
        };
        let cursor = match self.slider.reclamp(geometry.container_width) {
            Some(cursor) => cursor,
            None => self.slider.center(geometry.container_width),
        };
        let scale = ctx
            .viewports
            .geometry(ViewportRole::Overlay)
            .map(|state| state.scale());
        let mirrored = TransformPipeline::apply(&ctx.transforms.right).is_mirrored_horizontally();
        let clip = self.slider.clip(&geometry, scale, mirrored);

        ctx.surface.set_slider_handle(Some(cursor));
        ctx.surface.set_compositing(&Compositing::Clip(clip));
    }

    /// Routes a controller's geometry change event.
    ///
    /// Returns how many peer controllers were updated.
    pub fn on_geometry_change(&mut self, role: ViewportRole, ctx: &mut ModeContext<'_>) -> usize {
        match self.mode {
            ComparisonMode::SideBySide => ctx.viewports.on_geometry_change(role),
            ComparisonMode::Slider if role == ViewportRole::Overlay => {
                self.refresh_slider(ctx);
                0
            }
            _ => 0,
        }
    }

    pub fn on_slider_handle_down(&mut self) {
        if self.mode == ComparisonMode::Slider {
            self.slider.begin_drag();
        }
    }

    /// Click-to-position on the container. Presses on the handle itself only start a drag.
    pub fn on_container_pointer_down(
        &mut self,
        client_x: f64,
        on_handle: bool,
        ctx: &mut ModeContext<'_>,
    ) {
        if self.mode != ComparisonMode::Slider {
            return;
        }
        if !on_handle {
            if let Some(geometry) = ctx.surface.slider_geometry() {
                self.slider
                    .set_cursor(container_x(&geometry, client_x), geometry.container_width);
                self.refresh_slider(ctx);
            }
        }
        self.slider.begin_drag();
    }

    pub fn on_pointer_move(&mut self, client_x: f64, ctx: &mut ModeContext<'_>) {
        if self.mode != ComparisonMode::Slider || !self.slider.is_dragging() {
            return;
        }
        let Some(geometry) = ctx.surface.slider_geometry() else {
            return;
        };
        if self
            .slider
            .drag_to(container_x(&geometry, client_x), geometry.container_width)
            .is_some()
        {
            self.refresh_slider(ctx);
        }
    }

    pub fn on_pointer_up(&mut self) {
        self.slider.end_drag();
    }

    /// Repaints one slot's transform, refreshing the slider clip when it depends on it.
    pub fn repaint_transform(&mut self, slot: Slot, ctx: &mut ModeContext<'_>) {
        TransformPipeline::paint_slot(&mut *ctx.surface, slot, ctx.transforms.get(slot));
        if slot == Slot::Right {
            self.refresh_slider(ctx);
        }
    }
}

fn container_x(geometry: &SliderGeometry, client_x: f64) -> f64 {
    client_x - geometry.container_left
}
