//! Comparator use case.
//!
//! `ComparatorService` owns one open `ComparisonSession` and performs the
//! asynchronous work around it. The session sits behind a `tokio::sync::Mutex`
//! that is only held for synchronous state changes; every network round trip
//! happens with the lock released, and its result is applied through the
//! session's request tracker so a superseded response never lands.

use comparator_core::asset::AssetProbe;
use comparator_core::config::ComparatorConfig;
use comparator_core::error::{ComparatorError, Result};
use comparator_core::host::HostPage;
use comparator_core::input::LoadTarget;
use comparator_core::mode::ComparisonMode;
use comparator_core::preference::PreferenceStore;
use comparator_core::related::{PagePreviewSource, PreviewMode, RelatedItemResolver, RelatedSource};
use comparator_core::session::ComparisonSession;
use comparator_core::site::{
    CompareLink, PageContext, PagePreviews, PreviewAnchor, SiteAdapter, plan_compare_links,
};
use comparator_core::slot::{ImageId, ImageSlot};
use comparator_core::surface::ComparisonSurface;
use comparator_infrastructure::SiteRegistry;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// How a load request ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The image is in the right slot. `input_echo` is what the input field should show.
    Loaded {
        slot: ImageSlot,
        input_echo: String,
    },
    /// A newer request (or a swap / clear) made this response irrelevant.
    Superseded,
}

/// Use case for one open comparison panel.
///
/// Cloning is cheap and every clone drives the same session, so the embedder
/// can hand one clone to each event handler and spawn background work on others.
#[derive(Clone)]
pub struct ComparatorService {
    session: Arc<Mutex<ComparisonSession>>,
    context: PageContext,
    adapter: Arc<dyn SiteAdapter>,
    probe: Arc<dyn AssetProbe>,
}

impl ComparatorService {
    /// Opens a panel on `host` if one of the registered adapters recognizes it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the page is not a comparable page of any origin.
    pub fn open(
        host: &dyn HostPage,
        surface: Box<dyn ComparisonSurface>,
        registry: &SiteRegistry,
        probe: Arc<dyn AssetProbe>,
        preferences: Arc<dyn PreferenceStore>,
        config: &ComparatorConfig,
    ) -> Result<Self> {
        let location = host.location();
        let (adapter, context) = registry
            .detect(&location, &host.hints())
            .ok_or_else(|| ComparatorError::not_found("comparable page", location.as_str()))?;

        let left = context.initial_left(host.current_image_url());
        let session =
            ComparisonSession::open(context.clone(), left, surface, preferences, config);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            context,
            adapter,
            probe,
        })
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    /// Exclusive access to the session for synchronous operations
    /// (transforms, compositing controls, surface events).
    pub async fn session(&self) -> MutexGuard<'_, ComparisonSession> {
        self.session.lock().await
    }

    /// Switches the mode; the choice is persisted by the session.
    pub async fn set_mode(&self, mode: ComparisonMode) -> Result<()> {
        self.session.lock().await.set_mode(mode)
    }

    /// Resolves related candidates for the page and merges them into the selector.
    ///
    /// Sources run concurrently; a failing source only removes its own
    /// candidates. Entries announced while the sources were running are kept.
    /// Returns the number of candidates offered.
    pub async fn refresh_candidates(&self, previews: &PagePreviews) -> Result<usize> {
        let sources = self.adapter.related_sources(&self.context, previews);
        let resolver = RelatedItemResolver::new(sources);
        let candidates = resolver.resolve(self.context.post_id.as_deref()).await;

        let mut session = self.session.lock().await;
        let added = session.append_candidates(candidates.iter().cloned().collect())?;
        tracing::debug!("[ComparatorService] Resolved {} new candidates", added);
        Ok(session.candidates().len())
    }

    /// Handles previews the host page added after the panel opened.
    ///
    /// Their candidates are appended to the selector and the returned links
    /// tell the embedder where to insert "compare »" anchors.
    pub async fn announce_previews(&self, anchors: Vec<PreviewAnchor>) -> Result<Vec<CompareLink>> {
        let links = plan_compare_links(&self.context, &anchors);
        let mode = if self.context.kind.is_search() {
            PreviewMode::Similar
        } else {
            PreviewMode::Hierarchy
        };
        let previews = PagePreviews {
            anchors,
            ..PagePreviews::default()
        };
        let source = PagePreviewSource::new(self.context.site, mode, previews);
        let items = source
            .related(self.context.post_id.as_deref())
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("[ComparatorService] Ignoring announced previews: {}", e);
                Vec::new()
            });

        let added = self.session.lock().await.append_candidates(items)?;
        tracing::debug!(
            "[ComparatorService] {} new candidates, {} compare links",
            added,
            links.len()
        );
        Ok(links)
    }

    /// Fetches the query image of an IQDB page that only names a post id.
    ///
    /// Returns whether the left slot changed. Lookup failures are logged and
    /// leave the panel as it is.
    pub async fn bootstrap_search_image(&self) -> Result<bool> {
        let post_id = {
            let session = self.session.lock().await;
            if !self.context.needs_search_image(&session.slots().left) {
                return Ok(false);
            }
            match self.context.post_id.clone() {
                Some(id) => id,
                None => return Ok(false),
            }
        };

        let slot = match self.adapter.resolve_image(&post_id).await {
            Ok(slot) => slot,
            Err(e) => {
                tracing::warn!(
                    "[ComparatorService] Could not resolve search image for post {}: {}",
                    post_id,
                    e
                );
                return Ok(false);
            }
        };

        let mut session = self.session.lock().await;
        if !session.slots().left.is_empty() {
            return Ok(false);
        }
        session.set_left(slot)?;
        Ok(true)
    }

    /// Loads the "Enter ID or URL" input into the right slot.
    ///
    /// # Errors
    ///
    /// Input, lookup and image failures are shown on the surface and then
    /// returned. A response overtaken by a newer request is not an error.
    pub async fn load(&self, input: &str) -> Result<LoadOutcome> {
        match LoadTarget::parse(input) {
            Ok(target) => self.load_target(target).await,
            Err(e) => {
                self.session.lock().await.report(&e);
                Err(e)
            }
        }
    }

    /// Loads the candidate picked in the selector.
    pub async fn select_candidate(&self, id: &str) -> Result<LoadOutcome> {
        let target = self.session.lock().await.select_candidate(id)?;
        self.load_target(target).await
    }

    async fn load_target(&self, target: LoadTarget) -> Result<LoadOutcome> {
        let ticket = self.session.lock().await.begin_load(&target)?;

        let resolved = self.resolve(&target).await;

        let mut session = self.session.lock().await;
        if !session.is_current(&ticket) {
            tracing::debug!(
                "[ComparatorService] Discarding response for '{}'",
                ticket.target()
            );
            return Ok(LoadOutcome::Superseded);
        }
        match resolved {
            Ok(slot) => {
                session.commit_load(&ticket, slot.clone())?;
                Ok(LoadOutcome::Loaded {
                    slot,
                    input_echo: target.input_echo().to_string(),
                })
            }
            Err(e) => {
                session.fail_load(&ticket, &e);
                Err(e)
            }
        }
    }

    async fn resolve(&self, target: &LoadTarget) -> Result<ImageSlot> {
        let slot = match target {
            LoadTarget::Post(id) => self.adapter.resolve_image(id).await?,
            LoadTarget::Url(url) => ImageSlot::new(ImageId::Custom, url.clone()),
        };
        let url = slot
            .url
            .clone()
            .ok_or_else(|| ComparatorError::network(None, "Post has no image"))?;
        let asset = self.probe.probe(&url).await?;
        Ok(slot.with_dimensions(Some(asset.dimensions)))
    }

    /// Closes the panel. In-flight work finishes silently.
    pub async fn close(&self) {
        self.session.lock().await.close();
    }

    pub async fn is_closed(&self) -> bool {
        self.session.lock().await.is_closed()
    }
}

impl std::fmt::Debug for ComparatorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparatorService")
            .field("context", &self.context)
            .field("site", &self.adapter.site())
            .finish()
    }
}
