use async_trait::async_trait;
use comparator_core::error::{ComparatorError, Result};
use comparator_core::related::{
    HierarchySource, PagePreviewSource, PreviewMode, RelatedSource, SimilaritySource,
};
use comparator_core::site::{PageContext, PageKind, PagePreviews, Site, SiteAdapter};
use comparator_core::slot::{ImageId, ImageSlot};
use std::sync::Arc;

use super::not_found;
use crate::backend::{DanbooruBackend, DanbooruPost};

/// Danbooru: post, upload and IQDB pages.
pub struct DanbooruAdapter {
    backend: Arc<DanbooruBackend>,
}

impl DanbooruAdapter {
    pub fn new(backend: Arc<DanbooruBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl SiteAdapter for DanbooruAdapter {
    fn site(&self) -> Site {
        Site::Danbooru
    }

    fn related_sources(
        &self,
        context: &PageContext,
        previews: &PagePreviews,
    ) -> Vec<Arc<dyn RelatedSource>> {
        let mut sources: Vec<Arc<dyn RelatedSource>> = Vec::new();
        match context.kind {
            PageKind::Post => {
                sources.push(Arc::new(PagePreviewSource::new(
                    Site::Danbooru,
                    PreviewMode::Hierarchy,
                    previews.clone(),
                )));
                sources.push(Arc::new(HierarchySource::new(
                    Site::Danbooru,
                    self.backend.clone(),
                )));
            }
            PageKind::IqdbQuery | PageKind::Upload | PageKind::Similar => {
                sources.push(Arc::new(PagePreviewSource::new(
                    Site::Danbooru,
                    PreviewMode::Similar,
                    previews.clone(),
                )));
                if context.post_id.is_some() {
                    sources.push(Arc::new(SimilaritySource::new(
                        Site::Danbooru,
                        self.backend.clone(),
                    )));
                }
            }
        }
        sources
    }

    async fn resolve_image(&self, post_id: &str) -> Result<ImageSlot> {
        let post = self.backend.post(post_id).await.map_err(|e| match e {
            ComparatorError::InvalidInput(_) => e,
            other => {
                tracing::warn!("[DanbooruAdapter] Lookup of #{} failed: {}", post_id, other);
                not_found(&other)
            }
        })?;
        slot_for(post_id, &post)
    }
}

fn slot_for(post_id: &str, post: &DanbooruPost) -> Result<ImageSlot> {
    let dimensions = post.clone().into_record().dimensions;
    let url = post.image_url().ok_or_else(|| {
        ComparatorError::network(None, format!("Post #{} has no accessible file", post_id))
    })?;
    Ok(ImageSlot::new(ImageId::post(post_id), url).with_dimensions(dimensions))
}
