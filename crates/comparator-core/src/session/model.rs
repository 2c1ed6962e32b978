use std::sync::Arc;

use uuid::Uuid;

use super::requests::{LoadTicket, RequestTracker};
use crate::config::ComparatorConfig;
use crate::disposables::{DisposableArena, Scope};
use crate::error::{ComparatorError, Result};
use crate::input::LoadTarget;
use crate::mode::{
    ComparisonMode, DifferenceBackground, FilterSettings, ModeContext, ModeStateMachine,
    OverlaySettings, SliderController,
};
use crate::preference::{self, PreferenceStore};
use crate::related::{CandidateList, RelatedItem};
use crate::site::PageContext;
use crate::slot::{ImageSlot, Slot, SlotPair};
use crate::surface::{ComparisonSurface, EventSource, Notice, ViewportRole};
use crate::transform::{TransformOp, TransformState};
use crate::viewport::{ViewportState, ViewportSyncEngine};

/// Key that closes the panel.
pub const CLOSE_KEY: &str = "Escape";

/// All state of one open comparison panel.
///
/// Created when the panel opens and closed exactly once. Every operation
/// leaves the surface fully re-rendered before it returns; after `close`
/// every operation fails with `SessionClosed`.
pub struct ComparisonSession {
    id: Uuid,
    context: PageContext,
    surface: Box<dyn ComparisonSurface>,
    viewports: ViewportSyncEngine,
    disposables: DisposableArena,
    machine: ModeStateMachine,
    slots: SlotPair<ImageSlot>,
    transforms: SlotPair<TransformState>,
    viewport: ViewportState,
    overlay: OverlaySettings,
    filters: FilterSettings,
    candidates: CandidateList,
    requests: RequestTracker,
    preferences: Arc<dyn PreferenceStore>,
    closed: bool,
}

impl ComparisonSession {
    /// Opens the panel in the persisted mode with the page's image on the left.
    pub fn open(
        context: PageContext,
        left: ImageSlot,
        surface: Box<dyn ComparisonSurface>,
        preferences: Arc<dyn PreferenceStore>,
        config: &ComparatorConfig,
    ) -> Self {
        let exclude = context.post_id.clone();
        let mut session = Self {
            id: Uuid::new_v4(),
            context,
            surface,
            viewports: ViewportSyncEngine::new(),
            disposables: DisposableArena::new(),
            machine: ModeStateMachine::new(config.calculator()),
            slots: SlotPair::new(left, ImageSlot::empty()),
            transforms: SlotPair::default(),
            viewport: ViewportState::default(),
            overlay: config.overlay_settings(),
            filters: FilterSettings::default(),
            candidates: CandidateList::new(exclude),
            requests: RequestTracker::new(),
            preferences,
            closed: false,
        };

        let mode = preference::load_mode(session.preferences.as_ref());
        tracing::info!(
            "[ComparisonSession] Opening {} on {} ({:?} page) in {}",
            session.id,
            session.context.site,
            session.context.kind,
            mode
        );

        session
            .disposables
            .subscribe(Scope::Session, session.surface.as_mut(), EventSource::Keydown);
        session.surface.set_candidates(&session.candidates);
        session.refresh_info();
        let (machine, mut ctx) = session.parts();
        machine.start(mode, &mut ctx);
        session
    }

    fn parts(&mut self) -> (&mut ModeStateMachine, ModeContext<'_>) {
        let ctx = ModeContext {
            surface: self.surface.as_mut(),
            viewports: &mut self.viewports,
            disposables: &mut self.disposables,
            slots: &self.slots,
            transforms: &self.transforms,
            overlay: &mut self.overlay,
            filters: &self.filters,
            viewport: &mut self.viewport,
        };
        (&mut self.machine, ctx)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(ComparatorError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn rerender(&mut self) {
        let (machine, mut ctx) = self.parts();
        machine.rerender(&mut ctx);
    }

    fn refresh_info(&mut self) {
        let text = self.info_text();
        self.surface.set_info(&text);
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    pub fn mode(&self) -> ComparisonMode {
        self.machine.mode()
    }

    pub fn slots(&self) -> &SlotPair<ImageSlot> {
        &self.slots
    }

    pub fn transforms(&self) -> &SlotPair<TransformState> {
        &self.transforms
    }

    /// Last committed pan/zoom. Live controllers may have moved since.
    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    /// Geometry the panel is showing, or about to show once a queued restore lands.
    pub fn live_viewport(&self) -> Option<ViewportState> {
        self.viewports.capture()
    }

    pub fn overlay(&self) -> &OverlaySettings {
        &self.overlay
    }

    pub fn filters(&self) -> &FilterSettings {
        &self.filters
    }

    pub fn slider(&self) -> &SliderController {
        self.machine.slider()
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Subscriptions currently recorded in the disposables arena.
    pub fn live_subscriptions(&self) -> usize {
        self.disposables.live_subscriptions()
    }

    pub fn live_controllers(&self) -> usize {
        self.viewports.live_count()
    }

    /// "Compare: a vs b", empty while the right slot is empty.
    pub fn info_text(&self) -> String {
        if self.slots.right.is_empty() {
            return String::new();
        }
        format!(
            "Compare: {} vs {}",
            self.slots.left.id.label(),
            self.slots.right.id.label()
        )
    }

    // ============================================================================
    // Mode and compositing controls
    // ============================================================================

    /// Switches mode and persists the choice (best effort).
    pub fn set_mode(&mut self, mode: ComparisonMode) -> Result<()> {
        self.ensure_open()?;
        let (machine, mut ctx) = self.parts();
        machine.set_mode(mode, &mut ctx);
        preference::save_mode(self.preferences.as_ref(), mode);
        Ok(())
    }

    /// Fade opacity in percent, clamped to 100.
    pub fn set_opacity(&mut self, percent: u8) -> Result<()> {
        self.ensure_open()?;
        self.overlay.opacity = percent.min(100);
        if self.mode() == ComparisonMode::Fade {
            let (machine, mut ctx) = self.parts();
            machine.apply_compositing(&mut ctx);
        }
        Ok(())
    }

    pub fn set_difference_background(&mut self, background: DifferenceBackground) -> Result<()> {
        self.ensure_open()?;
        self.overlay.background = background;
        self.refresh_difference();
        Ok(())
    }

    pub fn toggle_difference_invert(&mut self) -> Result<bool> {
        self.ensure_open()?;
        self.overlay.inverted = !self.overlay.inverted;
        self.refresh_difference();
        Ok(self.overlay.inverted)
    }

    fn refresh_difference(&mut self) {
        if self.mode() == ComparisonMode::Difference {
            let (machine, mut ctx) = self.parts();
            machine.apply_compositing(&mut ctx);
        }
    }

    pub fn set_filters(&mut self, brightness: f64, saturate: f64) -> Result<()> {
        self.ensure_open()?;
        self.filters = FilterSettings::new(brightness, saturate);
        if self.mode().is_overlay() {
            self.surface.set_filters(&self.filters);
        }
        Ok(())
    }

    pub fn reset_filters(&mut self) -> Result<()> {
        self.set_filters(1.0, 1.0)
    }

    /// Returns every live controller to its default framing.
    pub fn reset_zoom(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.viewports.reset();
        self.viewport = ViewportState::default();
        let (machine, mut ctx) = self.parts();
        machine.refresh_slider(&mut ctx);
        Ok(())
    }

    // ============================================================================
    // Transforms and slots
    // ============================================================================

    pub fn transform(&mut self, slot: Slot, op: TransformOp) -> Result<TransformState> {
        self.ensure_open()?;
        self.transforms.get_mut(slot).apply(op);
        tracing::debug!(
            "[ComparisonSession] {:?} on {:?} -> {:?}",
            op,
            slot,
            self.transforms.get(slot)
        );
        let (machine, mut ctx) = self.parts();
        machine.repaint_transform(slot, &mut ctx);
        Ok(*self.transforms.get(slot))
    }

    pub fn toggle_flip_horizontal(&mut self, slot: Slot) -> Result<TransformState> {
        self.transform(slot, TransformOp::FlipHorizontal)
    }

    pub fn toggle_flip_vertical(&mut self, slot: Slot) -> Result<TransformState> {
        self.transform(slot, TransformOp::FlipVertical)
    }

    pub fn rotate(&mut self, slot: Slot) -> Result<TransformState> {
        self.transform(slot, TransformOp::Rotate)
    }

    /// Resets both slots' transforms.
    pub fn reset_transforms(&mut self) -> Result<()> {
        for slot in Slot::BOTH {
            self.transform(slot, TransformOp::Reset)?;
        }
        Ok(())
    }

    /// Exchanges images and transforms of both slots.
    pub fn swap(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.requests.invalidate();
        self.slots.swap();
        self.transforms.swap();
        self.refresh_info();
        self.rerender();
        Ok(())
    }

    /// Empties the right slot and resets its transform.
    pub fn clear_right(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.requests.invalidate();
        self.slots.right = ImageSlot::empty();
        self.transforms.right = TransformState::identity();
        self.refresh_info();
        self.rerender();
        Ok(())
    }

    /// Replaces the left image, used once a search page's query image is known.
    pub fn set_left(&mut self, slot: ImageSlot) -> Result<()> {
        self.ensure_open()?;
        tracing::debug!("[ComparisonSession] Left image is now {}", slot.id);
        self.slots.left = slot;
        self.refresh_info();
        self.rerender();
        Ok(())
    }

    // ============================================================================
    // Loading
    // ============================================================================

    /// Registers a load of `target` into the right slot. Supersedes any load in flight.
    pub fn begin_load(&mut self, target: &LoadTarget) -> Result<LoadTicket> {
        self.ensure_open()?;
        let label = match target {
            LoadTarget::Post(id) => id.as_str(),
            LoadTarget::Url(url) => url.as_str(),
        };
        tracing::info!("[ComparisonSession] Loading {}", label);
        Ok(self.requests.begin(label))
    }

    /// Whether a response for `ticket` would still be applied.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        !self.closed && self.requests.is_current(ticket)
    }

    /// Applies a resolved image to the right slot, unless a newer request superseded it.
    pub fn commit_load(&mut self, ticket: &LoadTicket, slot: ImageSlot) -> Result<()> {
        self.ensure_open()?;
        self.requests.finish(ticket)?;
        tracing::info!(
            "[ComparisonSession] Loaded {} into the right slot",
            slot.id.label()
        );
        self.slots.right = slot;
        self.refresh_info();
        self.viewports.reset();
        self.viewport = ViewportState::default();
        self.rerender();
        Ok(())
    }

    /// Reports a failed load. The right slot keeps its previous image.
    ///
    /// Returns whether the failure was shown to the user.
    pub fn fail_load(&mut self, ticket: &LoadTicket, error: &ComparatorError) -> bool {
        if self.ensure_open().is_err() || self.requests.finish(ticket).is_err() {
            return false;
        }
        tracing::warn!(
            "[ComparisonSession] Load of '{}' failed: {}",
            ticket.target(),
            error
        );
        self.report(error)
    }

    /// Shows an error to the user when its category allows it.
    pub fn report(&mut self, error: &ComparatorError) -> bool {
        match error.user_message() {
            Some(message) if !self.closed => {
                self.surface.notify(Notice::error(message));
                true
            }
            _ => false,
        }
    }

    // ============================================================================
    // Candidates
    // ============================================================================

    /// Replaces the candidate list.
    pub fn set_candidates(&mut self, items: Vec<RelatedItem>) -> Result<usize> {
        self.ensure_open()?;
        self.candidates = CandidateList::from_items(items, self.context.post_id.as_deref());
        self.surface.set_candidates(&self.candidates);
        Ok(self.candidates.len())
    }

    /// Adds candidates announced after the initial resolution.
    pub fn append_candidates(&mut self, items: Vec<RelatedItem>) -> Result<usize> {
        self.ensure_open()?;
        let added = self.candidates.append(items);
        if added > 0 {
            self.surface.set_candidates(&self.candidates);
        }
        Ok(added)
    }

    /// Load target for a candidate picked in the selector.
    pub fn select_candidate(&self, id: &str) -> Result<LoadTarget> {
        self.ensure_open()?;
        if self.candidates.contains(id) {
            Ok(LoadTarget::Post(id.to_string()))
        } else {
            Err(ComparatorError::not_found("candidate", id))
        }
    }

    // ============================================================================
    // Events delivered by the surface
    // ============================================================================

    /// Next tick after a render: restores geometry and places the slider.
    pub fn flush_deferred(&mut self) -> Result<bool> {
        self.ensure_open()?;
        let (machine, mut ctx) = self.parts();
        Ok(machine.on_next_tick(&mut ctx))
    }

    pub fn on_geometry_change(&mut self, role: ViewportRole) -> Result<usize> {
        self.ensure_open()?;
        let (machine, mut ctx) = self.parts();
        Ok(machine.on_geometry_change(role, &mut ctx))
    }

    pub fn on_slider_handle_down(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.machine.on_slider_handle_down();
        Ok(())
    }

    pub fn on_container_pointer_down(&mut self, client_x: f64, on_handle: bool) -> Result<()> {
        self.ensure_open()?;
        let (machine, mut ctx) = self.parts();
        machine.on_container_pointer_down(client_x, on_handle, &mut ctx);
        Ok(())
    }

    pub fn on_pointer_move(&mut self, client_x: f64) -> Result<()> {
        self.ensure_open()?;
        let (machine, mut ctx) = self.parts();
        machine.on_pointer_move(client_x, &mut ctx);
        Ok(())
    }

    pub fn on_pointer_up(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.machine.on_pointer_up();
        Ok(())
    }

    /// Document key press. Returns `true` when the key closed the session.
    pub fn on_key(&mut self, key: &str) -> Result<bool> {
        self.ensure_open()?;
        if key == CLOSE_KEY {
            self.close();
            return Ok(true);
        }
        Ok(false)
    }

    /// Releases every subscription and controller. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.requests.invalidate();
        let (machine, mut ctx) = self.parts();
        machine.teardown(&mut ctx);
        let released = self
            .disposables
            .drain_all(self.surface.as_mut(), &mut self.viewports);
        self.viewports.detach_all();
        self.closed = true;
        tracing::info!(
            "[ComparisonSession] Closed {} ({} session resources released)",
            self.id,
            released
        );
    }
}

impl std::fmt::Debug for ComparisonSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonSession")
            .field("id", &self.id)
            .field("context", &self.context)
            .field("mode", &self.machine.mode())
            .field("slots", &self.slots)
            .field("transforms", &self.transforms)
            .field("viewport", &self.viewport)
            .field("candidates", &self.candidates.len())
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preference::MODE_KEY;
    use crate::related::RelationshipKind;
    use crate::site::{PageKind, Site};
    use crate::slot::ImageId;
    use crate::surface::{Compositing, Topology};
    use crate::testing::{RecordingSurface, SurfaceLog};
    use crate::transform::Rotation;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore(Mutex<HashMap<String, String>>);

    impl PreferenceStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.0
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    struct FailingStore;

    impl PreferenceStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(ComparatorError::persistence("locked"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(ComparatorError::persistence("read-only"))
        }
    }

    fn context() -> PageContext {
        PageContext {
            site: Site::Danbooru,
            kind: PageKind::Post,
            post_id: Some("100".into()),
            search_url: None,
        }
    }

    fn open_with(store: Arc<dyn PreferenceStore>) -> (ComparisonSession, Arc<Mutex<SurfaceLog>>) {
        let surface = RecordingSurface::new();
        let log = surface.handle();
        let left = ImageSlot::new(ImageId::post("100"), "https://cdn.test/100.png");
        let session = ComparisonSession::open(
            context(),
            left,
            Box::new(surface),
            store,
            &ComparatorConfig::default(),
        );
        (session, log)
    }

    fn open() -> (ComparisonSession, Arc<Mutex<SurfaceLog>>) {
        open_with(Arc::new(MemoryStore::default()))
    }

    fn load(session: &mut ComparisonSession, id: &str) {
        let ticket = session.begin_load(&LoadTarget::Post(id.into())).unwrap();
        let slot = ImageSlot::new(ImageId::post(id), format!("https://cdn.test/{}.png", id));
        session.commit_load(&ticket, slot).unwrap();
    }

    #[test]
    fn test_open_restores_persisted_mode() {
        let store = Arc::new(MemoryStore::default());
        store.set(MODE_KEY, "fade").unwrap();
        let (session, log) = open_with(store);

        assert_eq!(session.mode(), ComparisonMode::Fade);
        let log = log.lock().unwrap();
        assert_eq!(log.topology, Some(Topology::Overlay));
        // Keydown plus the single wheel subscription of Fade.
        assert_eq!(log.subscriptions.len(), 2);
        assert!(log.live_sources().contains(&EventSource::Keydown));
    }

    #[test]
    fn test_set_mode_persists_choice() {
        let store = Arc::new(MemoryStore::default());
        let (mut session, _log) = open_with(store.clone());
        session.set_mode(ComparisonMode::Difference).unwrap();
        assert_eq!(store.get(MODE_KEY).unwrap().as_deref(), Some("difference"));
    }

    #[test]
    fn test_broken_preferences_are_ignored() {
        let (mut session, _log) = open_with(Arc::new(FailingStore));
        assert_eq!(session.mode(), ComparisonMode::SideBySide);
        assert!(session.set_mode(ComparisonMode::Slider).is_ok());
        assert_eq!(session.mode(), ComparisonMode::Slider);
    }

    #[test]
    fn test_swap_twice_restores_pairing() {
        let (mut session, _log) = open();
        load(&mut session, "200");
        session.toggle_flip_horizontal(Slot::Left).unwrap();
        session.rotate(Slot::Right).unwrap();
        let slots = session.slots().clone();
        let transforms = session.transforms().clone();

        session.swap().unwrap();
        assert_eq!(session.slots().left, slots.right);
        assert_eq!(session.transforms().left, transforms.right);
        assert_eq!(session.info_text(), "Compare: #200 vs #100");

        session.swap().unwrap();
        assert_eq!(session.slots(), &slots);
        assert_eq!(session.transforms(), &transforms);
    }

    #[test]
    fn test_rotation_wraps() {
        let (mut session, _log) = open();
        for _ in 0..5 {
            session.rotate(Slot::Left).unwrap();
        }
        assert_eq!(session.transforms().left.rotation, Rotation::Deg90);
        session.toggle_flip_vertical(Slot::Left).unwrap();
        session.toggle_flip_vertical(Slot::Left).unwrap();
        assert!(!session.transforms().left.flip_v);
        assert_eq!(session.transforms().left.rotation, Rotation::Deg90);
    }

    #[test]
    fn test_commit_load_updates_info_and_resets_zoom() {
        let (mut session, log) = open();
        session.flush_deferred().unwrap();
        log.lock()
            .unwrap()
            .controllers
            .insert(ViewportRole::Left, ViewportState::new(3.0, 10.0, 5.0).unwrap());

        load(&mut session, "200");

        assert_eq!(session.info_text(), "Compare: #100 vs #200");
        assert_eq!(session.viewport(), ViewportState::default());
        let log = log.lock().unwrap();
        assert_eq!(log.info, "Compare: #100 vs #200");
        assert_eq!(
            log.controllers.get(&ViewportRole::Left),
            Some(&ViewportState::default())
        );
    }

    #[test]
    fn test_swap_before_tick_keeps_zoom() {
        let (mut session, log) = open();
        load(&mut session, "200");
        session.flush_deferred().unwrap();
        let zoomed = ViewportState::new(2.5, -12.0, 8.0).unwrap();
        {
            let mut log = log.lock().unwrap();
            log.controllers.insert(ViewportRole::Left, zoomed);
            log.controllers.insert(ViewportRole::Right, zoomed);
        }

        session.set_mode(ComparisonMode::Fade).unwrap();
        session.swap().unwrap();
        session.set_mode(ComparisonMode::SideBySide).unwrap();
        session.flush_deferred().unwrap();

        assert!(session.viewport().approx_eq(&zoomed, 1e-9));
        let left = log.lock().unwrap().controllers[&ViewportRole::Left];
        assert!(left.approx_eq(&zoomed, 1e-9), "left = {:?}", left);
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let (mut session, _log) = open();
        let slow = session.begin_load(&LoadTarget::Post("1".into())).unwrap();
        let fast = session.begin_load(&LoadTarget::Post("2".into())).unwrap();

        let fast_slot = ImageSlot::new(ImageId::post("2"), "https://cdn.test/2.png");
        session.commit_load(&fast, fast_slot.clone()).unwrap();

        let slow_slot = ImageSlot::new(ImageId::post("1"), "https://cdn.test/1.png");
        let err = session.commit_load(&slow, slow_slot).unwrap_err();
        assert!(err.is_stale());
        assert_eq!(session.slots().right, fast_slot);
    }

    #[test]
    fn test_failed_load_keeps_previous_image() {
        let (mut session, log) = open();
        load(&mut session, "200");
        let before = session.slots().right.clone();

        let ticket = session
            .begin_load(&LoadTarget::Url("https://img.test/broken.png".into()))
            .unwrap();
        let shown = session.fail_load(
            &ticket,
            &ComparatorError::asset("https://img.test/broken.png", "bad header"),
        );

        assert!(shown);
        assert_eq!(session.slots().right, before);
        let log = log.lock().unwrap();
        assert_eq!(
            log.notices.last().map(|n| n.message.as_str()),
            Some("Failed to load image: https://img.test/broken.png")
        );
    }

    #[test]
    fn test_superseded_failure_is_silent() {
        let (mut session, log) = open();
        let ticket = session.begin_load(&LoadTarget::Post("1".into())).unwrap();
        session.clear_right().unwrap();
        assert!(!session.fail_load(&ticket, &ComparatorError::network(Some(404), "Post not found")));
        assert!(log.lock().unwrap().notices.is_empty());
    }

    #[test]
    fn test_clear_right_resets_its_transform() {
        let (mut session, log) = open();
        load(&mut session, "200");
        session.toggle_flip_horizontal(Slot::Right).unwrap();
        session.toggle_flip_horizontal(Slot::Left).unwrap();

        session.clear_right().unwrap();

        assert!(session.slots().right.is_empty());
        assert!(session.transforms().right.is_identity());
        assert!(session.transforms().left.flip_h);
        assert_eq!(log.lock().unwrap().info, "");
    }

    #[test]
    fn test_candidates_exclude_current_post() {
        let (mut session, log) = open();
        let count = session
            .set_candidates(vec![
                RelatedItem::new("100", RelationshipKind::Sibling),
                RelatedItem::new("7", RelationshipKind::Child),
                RelatedItem::new("3", RelationshipKind::Parent),
            ])
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(log.lock().unwrap().candidates, vec!["3", "7"]);

        let added = session
            .append_candidates(vec![
                RelatedItem::new("7", RelationshipKind::Child),
                RelatedItem::new("9", RelationshipKind::Similar),
            ])
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(log.lock().unwrap().candidates, vec!["9", "3", "7"]);

        assert_eq!(
            session.select_candidate("3").unwrap(),
            LoadTarget::Post("3".into())
        );
        assert!(session.select_candidate("100").unwrap_err().is_not_found());
    }

    #[test]
    fn test_opacity_applies_only_in_fade() {
        let (mut session, log) = open();
        load(&mut session, "200");
        session.set_opacity(80).unwrap();
        assert_eq!(log.lock().unwrap().compositing, Some(Compositing::None));

        session.set_mode(ComparisonMode::Fade).unwrap();
        assert_eq!(log.lock().unwrap().compositing, Some(Compositing::Opacity(0.8)));
        session.set_opacity(250).unwrap();
        assert_eq!(log.lock().unwrap().compositing, Some(Compositing::Opacity(1.0)));
    }

    #[test]
    fn test_difference_controls() {
        let (mut session, log) = open();
        load(&mut session, "200");
        session.set_mode(ComparisonMode::Difference).unwrap();
        session
            .set_difference_background(DifferenceBackground::White)
            .unwrap();
        assert!(session.toggle_difference_invert().unwrap());
        assert_eq!(
            log.lock().unwrap().compositing,
            Some(Compositing::Difference {
                background: DifferenceBackground::White,
                inverted: true,
            })
        );

        session.set_mode(ComparisonMode::Difference).unwrap();
        assert_eq!(session.overlay().background, DifferenceBackground::Black);
        assert!(!session.overlay().inverted);
    }

    #[test]
    fn test_filters_reach_overlay() {
        let (mut session, log) = open();
        session.set_mode(ComparisonMode::Fade).unwrap();
        session.set_filters(1.2, 0.5).unwrap();
        assert_eq!(
            log.lock().unwrap().filters,
            Some(FilterSettings::new(1.2, 0.5))
        );
        session.reset_filters().unwrap();
        assert!(session.filters().is_neutral());
    }

    #[test]
    fn test_escape_closes() {
        let (mut session, log) = open();
        assert!(!session.on_key("a").unwrap());
        assert!(session.on_key(CLOSE_KEY).unwrap());
        assert!(session.is_closed());
        assert!(log.lock().unwrap().subscriptions.is_empty());
        assert!(matches!(
            session.set_mode(ComparisonMode::Fade),
            Err(ComparatorError::SessionClosed)
        ));
    }

    #[test]
    fn test_close_releases_everything() {
        let (mut session, log) = open();
        load(&mut session, "200");
        session.set_mode(ComparisonMode::Slider).unwrap();
        session.toggle_flip_horizontal(Slot::Right).unwrap();
        session.close();
        session.close();

        assert!(session.transforms().right.flip_h);

        assert_eq!(session.live_subscriptions(), 0);
        assert_eq!(session.live_controllers(), 0);
        let log = log.lock().unwrap();
        assert!(log.subscriptions.is_empty());
        assert!(log.controllers.is_empty());
        assert_eq!(log.controllers_created, log.controllers_destroyed);
        assert!(log.overlay.is_none());
    }

    #[test]
    fn test_reopening_leaves_no_residue() {
        let surface = RecordingSurface::new();
        let log = surface.handle();
        let mut surface: Option<Box<dyn ComparisonSurface>> = Some(Box::new(surface));
        for round in 0..5 {
            let store: Arc<dyn PreferenceStore> = Arc::new(MemoryStore::default());
            let left = ImageSlot::new(ImageId::post("100"), "https://cdn.test/100.png");
            let current = surface.take().unwrap();
            let mut session =
                ComparisonSession::open(context(), left, current, store, &ComparatorConfig::default());
            if round % 2 == 0 {
                session.set_mode(ComparisonMode::Slider).unwrap();
            }
            session.close();
            surface = Some(session.surface);
        }
        let log = log.lock().unwrap();
        assert!(log.subscriptions.is_empty());
        assert!(log.controllers.is_empty());
    }

    #[test]
    fn test_slider_follows_pointer() {
        let (mut session, log) = open();
        load(&mut session, "200");
        session.set_mode(ComparisonMode::Slider).unwrap();
        session.flush_deferred().unwrap();
        assert_eq!(session.slider().cursor_x(), Some(400.0));

        session.on_container_pointer_down(100.0, false).unwrap();
        session.on_pointer_move(250.0).unwrap();
        session.on_pointer_up().unwrap();
        session.on_pointer_move(700.0).unwrap();

        assert_eq!(session.slider().cursor_x(), Some(250.0));
        assert_eq!(log.lock().unwrap().slider_handle, Some(250.0));
    }
}
