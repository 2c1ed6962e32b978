use async_trait::async_trait;
use comparator_core::error::{ComparatorError, Result};
use comparator_core::related::{HierarchySource, PagePreviewSource, PreviewMode, RelatedSource};
use comparator_core::site::{PageContext, PageKind, PagePreviews, Site, SiteAdapter};
use comparator_core::slot::{ImageId, ImageSlot};
use std::sync::Arc;

use super::not_found;
use crate::backend::MoebooruBackend;

/// Yande.re and Konachan: post-show and similar pages.
pub struct MoebooruAdapter {
    site: Site,
    backend: Arc<MoebooruBackend>,
}

impl MoebooruAdapter {
    pub fn yandere(backend: Arc<MoebooruBackend>) -> Self {
        Self {
            site: Site::Yandere,
            backend,
        }
    }

    pub fn konachan(backend: Arc<MoebooruBackend>) -> Self {
        Self {
            site: Site::Konachan,
            backend,
        }
    }
}

#[async_trait]
impl SiteAdapter for MoebooruAdapter {
    fn site(&self) -> Site {
        self.site
    }

    fn related_sources(
        &self,
        context: &PageContext,
        previews: &PagePreviews,
    ) -> Vec<Arc<dyn RelatedSource>> {
        let source: Arc<dyn RelatedSource> = match context.kind {
            PageKind::Similar => Arc::new(PagePreviewSource::new(
                self.site,
                PreviewMode::Similar,
                previews.clone(),
            )),
            _ => Arc::new(HierarchySource::new(self.site, self.backend.clone())),
        };
        vec![source]
    }

    async fn resolve_image(&self, post_id: &str) -> Result<ImageSlot> {
        let post = match self.backend.post(post_id).await {
            Ok(Some(post)) => post,
            Ok(None) => return Err(ComparatorError::network(Some(404), "Post not found")),
            Err(e) => {
                tracing::warn!(
                    "[MoebooruAdapter] Lookup of #{} on {} failed: {}",
                    post_id,
                    self.site,
                    e
                );
                return Err(not_found(&e));
            }
        };
        let record = post.into_record();
        let url = record.file_url.ok_or_else(|| {
            ComparatorError::network(None, format!("Post #{} has no accessible file", post_id))
        })?;
        Ok(ImageSlot::new(ImageId::post(post_id), url).with_dimensions(record.dimensions))
    }
}
