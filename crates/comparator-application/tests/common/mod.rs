//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use comparator_core::asset::{AssetInfo, AssetProbe};
use comparator_core::error::{ComparatorError, Result};
use comparator_core::host::HostPage;
use comparator_core::mode::{ComparisonMode, FilterSettings};
use comparator_core::related::{CandidateList, RelatedItem, RelatedSource};
use comparator_core::site::{
    PageContext, PageHints, PageLocation, PagePreviews, Site, SiteAdapter,
};
use comparator_core::slot::{Dimensions, ImageId, ImageSlot};
use comparator_core::surface::{
    ComparisonSurface, Compositing, ContentSize, EventSource, ImageElement, Notice,
    SliderGeometry, SubscriptionId, Topology, ViewportRole,
};
use comparator_core::transform::RenderInstruction;
use comparator_core::viewport::{ApplyOptions, PanZoomController, ViewportState};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Surface
// ============================================================================

#[derive(Debug, Default)]
pub struct PanelLog {
    pub topology: Option<Topology>,
    pub sources: HashMap<ImageElement, ImageSlot>,
    pub compositing: Option<Compositing>,
    pub subscriptions: HashMap<SubscriptionId, EventSource>,
    pub next_subscription: u64,
    pub controllers: HashMap<ViewportRole, ViewportState>,
    pub notices: Vec<Notice>,
    pub info: String,
    pub mode_selector: Option<ComparisonMode>,
    pub candidates: Vec<String>,
}

pub struct Panel {
    log: Arc<Mutex<PanelLog>>,
}

impl Panel {
    pub fn new() -> (Self, Arc<Mutex<PanelLog>>) {
        let log = Arc::new(Mutex::new(PanelLog::default()));
        (Self { log: log.clone() }, log)
    }
}

impl ComparisonSurface for Panel {
    fn content_size(&self) -> ContentSize {
        ContentSize::new(800.0, 600.0)
    }

    fn reference_natural_size(&self) -> Option<(u32, u32)> {
        Some((1000, 500))
    }

    fn slider_geometry(&self) -> Option<SliderGeometry> {
        Some(SliderGeometry {
            container_left: 0.0,
            container_width: 800.0,
            image_left: 0.0,
        })
    }

    fn show_topology(&mut self, topology: Topology) {
        self.log.lock().unwrap().topology = Some(topology);
    }

    fn build_overlay(&mut self, _left: &ImageSlot, _right: &ImageSlot) {}

    fn clear_overlay(&mut self) {}

    fn set_image_source(&mut self, element: ImageElement, slot: &ImageSlot) {
        self.log
            .lock()
            .unwrap()
            .sources
            .insert(element, slot.clone());
    }

    fn set_image_transform(&mut self, _element: ImageElement, _instruction: &RenderInstruction) {}

    fn set_compositing(&mut self, compositing: &Compositing) {
        self.log.lock().unwrap().compositing = Some(compositing.clone());
    }

    fn set_slider_handle(&mut self, _position: Option<f64>) {}

    fn set_filters(&mut self, _filters: &FilterSettings) {}

    fn create_controller(&mut self, role: ViewportRole) -> Box<dyn PanZoomController> {
        self.log
            .lock()
            .unwrap()
            .controllers
            .insert(role, ViewportState::default());
        Box::new(EchoController {
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

    fn request_next_tick(&mut self) {}

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

struct EchoController {
    role: ViewportRole,
    log: Arc<Mutex<PanelLog>>,
}

impl PanZoomController for EchoController {
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
        self.log.lock().unwrap().controllers.remove(&self.role);
    }
}

// ============================================================================
// Host page
// ============================================================================

pub struct StaticHost {
    pub href: String,
    pub hints: PageHints,
    pub image_url: Option<String>,
    pub previews: PagePreviews,
}

impl StaticHost {
    pub fn post_page(id: &str) -> Self {
        Self {
            href: format!("https://danbooru.donmai.us/posts/{}", id),
            hints: PageHints::default(),
            image_url: Some(format!("https://cdn.example/{}.png", id)),
            previews: PagePreviews::default(),
        }
    }
}

impl HostPage for StaticHost {
    fn location(&self) -> PageLocation {
        PageLocation::parse(&self.href).unwrap()
    }

    fn hints(&self) -> PageHints {
        self.hints.clone()
    }

    fn current_image_url(&self) -> Option<String> {
        self.image_url.clone()
    }

    fn previews(&self) -> PagePreviews {
        self.previews.clone()
    }
}

// ============================================================================
// Adapter, sources, probe
// ============================================================================

/// A source that answers with fixed items, or fails.
pub struct FixedSource {
    pub name: &'static str,
    pub items: Option<Vec<RelatedItem>>,
}

#[async_trait]
impl RelatedSource for FixedSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn related(&self, _post_id: Option<&str>) -> Result<Vec<RelatedItem>> {
        self.items
            .clone()
            .ok_or_else(|| ComparatorError::network(Some(503), "unavailable"))
    }
}

/// A source that answers only after `release` is notified, notifying `started` first.
#[derive(Default)]
pub struct GatedSource {
    pub items: Vec<RelatedItem>,
    pub started: Notify,
    pub release: Notify,
}

#[async_trait]
impl RelatedSource for GatedSource {
    fn name(&self) -> &str {
        "gated"
    }

    async fn related(&self, _post_id: Option<&str>) -> Result<Vec<RelatedItem>> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(self.items.clone())
    }
}

/// Danbooru adapter over an in-memory post table.
///
/// Lookups of ids in `gated` block until `release` is notified, after
/// notifying `started`.
#[derive(Default)]
pub struct ScriptedAdapter {
    pub posts: HashMap<String, String>,
    pub sources: Mutex<Vec<Arc<dyn RelatedSource>>>,
    pub gated: HashSet<String>,
    pub started: Notify,
    pub release: Notify,
    pub lookups: Mutex<Vec<String>>,
}

impl ScriptedAdapter {
    pub fn with_posts(ids: &[&str]) -> Self {
        Self {
            posts: ids
                .iter()
                .map(|id| (id.to_string(), format!("https://cdn.example/{}.png", id)))
                .collect(),
            ..Self::default()
        }
    }

    pub fn gate(mut self, id: &str) -> Self {
        self.gated.insert(id.to_string());
        self
    }

    pub fn add_source(&self, source: Arc<dyn RelatedSource>) {
        self.sources.lock().unwrap().push(source);
    }
}

#[async_trait]
impl SiteAdapter for ScriptedAdapter {
    fn site(&self) -> Site {
        Site::Danbooru
    }

    fn related_sources(
        &self,
        _context: &PageContext,
        _previews: &PagePreviews,
    ) -> Vec<Arc<dyn RelatedSource>> {
        self.sources.lock().unwrap().clone()
    }

    async fn resolve_image(&self, post_id: &str) -> Result<ImageSlot> {
        self.lookups.lock().unwrap().push(post_id.to_string());
        if self.gated.contains(post_id) {
            self.started.notify_one();
            self.release.notified().await;
        }
        match self.posts.get(post_id) {
            Some(url) => Ok(ImageSlot::new(ImageId::post(post_id), url.clone())),
            None => Err(ComparatorError::network(Some(404), "Post not found")),
        }
    }
}

/// Probe that decodes everything except the listed URLs.
#[derive(Default)]
pub struct ScriptedProbe {
    pub broken: HashSet<String>,
}

#[async_trait]
impl AssetProbe for ScriptedProbe {
    async fn probe(&self, url: &str) -> Result<AssetInfo> {
        if self.broken.contains(url) {
            return Err(ComparatorError::asset(url, "not an image"));
        }
        Ok(AssetInfo {
            url: url.to_string(),
            dimensions: Dimensions::new(640, 480),
        })
    }
}
