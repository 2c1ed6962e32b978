//! Origins, page context and the per-site adapter seam.
//!
//! # Module Structure
//!
//! - `Site`: the three supported origins
//! - `context`: `PageLocation`, `PageHints`, `PageKind`, `PageContext` (detection + labels)
//! - `preview`: preview anchors announced by the host page and compare-link planning
//! - `SiteAdapter`: backend-specific capabilities (detect, related sources, image resolution)

mod context;
mod preview;

pub use context::{PageContext, PageHints, PageKind, PageLocation};
pub use preview::{
    CompareLink, NoticeLink, PagePreviews, PreviewAnchor, PreviewSection, plan_compare_links,
};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumIter, EnumString};

use crate::error::Result;
use crate::related::RelatedSource;
use crate::slot::ImageSlot;

static POST_URL: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"https://(danbooru\.donmai\.us/posts|yande\.re/post/show|konachan\.com/post/show)/\d+")
        .ok()
});

static POST_ID_IN_URL: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"/(?:posts|show)/(\d+)").ok());

/// A supported origin.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Site {
    Danbooru,
    Yandere,
    Konachan,
}

impl Site {
    pub const ALL: [Site; 3] = [Site::Danbooru, Site::Yandere, Site::Konachan];

    pub fn host(self) -> &'static str {
        match self {
            Site::Danbooru => "danbooru.donmai.us",
            Site::Yandere => "yande.re",
            Site::Konachan => "konachan.com",
        }
    }

    pub fn from_host(host: &str) -> Option<Site> {
        Site::ALL.into_iter().find(|site| site.host() == host)
    }

    /// Yande.re and Konachan share the Moebooru schema and page conventions.
    pub fn is_moebooru(self) -> bool {
        !matches!(self, Site::Danbooru)
    }

    /// Whether `url` is a post page on any supported origin.
    pub fn is_post_url(url: &str) -> bool {
        POST_URL.as_ref().is_some_and(|re| re.is_match(url))
    }

    /// Post id embedded in a post page URL.
    pub fn extract_post_id(url: &str) -> Option<String> {
        POST_ID_IN_URL
            .as_ref()?
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// Backend-specific capabilities of one origin.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    fn site(&self) -> Site;

    /// Recognizes a comparable page on this origin.
    fn detect(&self, location: &PageLocation, hints: &PageHints) -> Option<PageContext> {
        if Site::from_host(location.host()?) != Some(self.site()) {
            return None;
        }
        PageContext::detect(self.site(), location, hints)
    }

    /// Sources to query for related candidates on this page.
    fn related_sources(
        &self,
        context: &PageContext,
        previews: &PagePreviews,
    ) -> Vec<Arc<dyn RelatedSource>>;

    /// Looks a post up and returns the slot to display it in.
    async fn resolve_image(&self, post_id: &str) -> Result<ImageSlot>;

    /// Post id from a post page URL of this origin.
    fn parse_post_url(&self, url: &str) -> Option<String> {
        if !url.contains(self.site().host()) || !Site::is_post_url(url) {
            return None;
        }
        Site::extract_post_id(url)
    }
}
