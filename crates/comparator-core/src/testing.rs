//! Recording doubles for the presentation collaborators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::mode::{ComparisonMode, FilterSettings};
use crate::related::CandidateList;
use crate::slot::ImageSlot;
use crate::surface::{
    ComparisonSurface, Compositing, ContentSize, EventSource, ImageElement, Notice,
    SliderGeometry, SubscriptionId, Topology, ViewportRole,
};
use crate::transform::RenderInstruction;
use crate::viewport::{ApplyOptions, PanZoomController, ViewportState};

#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub topology: Option<Topology>,
    pub overlay: Option<(ImageSlot, ImageSlot)>,
    pub overlay_builds: usize,
    pub sources: HashMap<ImageElement, ImageSlot>,
    pub transforms: HashMap<ImageElement, RenderInstruction>,
    pub compositing: Option<Compositing>,
    pub slider_handle: Option<f64>,
    pub filters: Option<FilterSettings>,
    pub subscriptions: HashMap<SubscriptionId, EventSource>,
    pub next_subscription: u64,
    pub controllers: HashMap<ViewportRole, ViewportState>,
    pub controllers_created: usize,
    pub controllers_destroyed: usize,
    pub tick_requests: usize,
    pub notices: Vec<Notice>,
    pub info: String,
    pub mode_selector: Option<ComparisonMode>,
    pub candidates: Vec<String>,
}

impl SurfaceLog {
    pub fn live_sources(&self) -> Vec<EventSource> {
        self.subscriptions.values().copied().collect()
    }
}

pub struct RecordingSurface {
    pub log: Arc<Mutex<SurfaceLog>>,
    pub content: ContentSize,
    pub natural: Option<(u32, u32)>,
    pub geometry: Option<SliderGeometry>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(SurfaceLog::default())),
            content: ContentSize::new(800.0, 600.0),
            natural: Some((1000, 500)),
            geometry: Some(SliderGeometry {
                container_left: 0.0,
                container_width: 800.0,
                image_left: 0.0,
            }),
        }
    }

    pub fn handle(&self) -> Arc<Mutex<SurfaceLog>> {
        self.log.clone()
    }
}

impl ComparisonSurface for RecordingSurface {
    fn content_size(&self) -> ContentSize {
        self.content
    }

    fn reference_natural_size(&self) -> Option<(u32, u32)> {
        self.natural
    }

    fn slider_geometry(&self) -> Option<SliderGeometry> {
        self.geometry
    }

    fn show_topology(&mut self, topology: Topology) {
        self.log.lock().unwrap().topology = Some(topology);
    }

    fn build_overlay(&mut self, left: &ImageSlot, right: &ImageSlot) {
        let mut log = self.log.lock().unwrap();
        log.overlay = Some((left.clone(), right.clone()));
        log.overlay_builds += 1;
    }

    fn clear_overlay(&mut self) {
        self.log.lock().unwrap().overlay = None;
    }

    fn set_image_source(&mut self, element: ImageElement, slot: &ImageSlot) {
        self.log
            .lock()
            .unwrap()
            .sources
            .insert(element, slot.clone());
    }

    fn set_image_transform(&mut self, element: ImageElement, instruction: &RenderInstruction) {
        self.log
            .lock()
            .unwrap()
            .transforms
            .insert(element, instruction.clone());
    }

    fn set_compositing(&mut self, compositing: &Compositing) {
        self.log.lock().unwrap().compositing = Some(compositing.clone());
    }

    fn set_slider_handle(&mut self, position: Option<f64>) {
        self.log.lock().unwrap().slider_handle = position;
    }

    fn set_filters(&mut self, filters: &FilterSettings) {
        self.log.lock().unwrap().filters = Some(*filters);
    }

    fn create_controller(&mut self, role: ViewportRole) -> Box<dyn PanZoomController> {
        let mut log = self.log.lock().unwrap();
        log.controllers_created += 1;
        log.controllers.insert(role, ViewportState::default());
        Box::new(RecordingController {
            role,
            log: self.log.clone(),
        })
    }

    fn subscribe(&mut self, source: EventSource) -> SubscriptionId {
        let mut log = self.log.lock().unwrap();
        log.next_subscription += 1;
        let id = SubscriptionId(log.next_subscription);
        log.subscriptions.insert(id, source);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.log.lock().unwrap().subscriptions.remove(&id);
    }

    fn request_next_tick(&mut self) {
        self.log.lock().unwrap().tick_requests += 1;
    }

    fn notify(&mut self, notice: Notice) {
        self.log.lock().unwrap().notices.push(notice);
    }

    fn set_info(&mut self, text: &str) {
        self.log.lock().unwrap().info = text.to_string();
    }

    fn set_mode_selector(&mut self, mode: ComparisonMode) {
        self.log.lock().unwrap().mode_selector = Some(mode);
    }

    fn set_candidates(&mut self, candidates: &CandidateList) {
        self.log.lock().unwrap().candidates = candidates.ids().map(str::to_string).collect();
    }
}

/// Controller whose geometry lives in the shared log, so tests can simulate
/// user pans by writing to it.
pub struct RecordingController {
    role: ViewportRole,
    log: Arc<Mutex<SurfaceLog>>,
}

impl PanZoomController for RecordingController {
    fn geometry(&self) -> ViewportState {
        self.log
            .lock()
            .unwrap()
            .controllers
            .get(&self.role)
            .copied()
            .unwrap_or_default()
    }

    fn apply(&mut self, state: ViewportState, options: ApplyOptions) -> Option<ViewportState> {
        self.log.lock().unwrap().controllers.insert(self.role, state);
        if options.silent { None } else { Some(state) }
    }

    fn reset(&mut self) {
        self.log
            .lock()
            .unwrap()
            .controllers
            .insert(self.role, ViewportState::default());
    }

    fn destroy(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.controllers.remove(&self.role);
        log.controllers_destroyed += 1;
    }
}
