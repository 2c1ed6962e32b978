use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::context::{PageContext, PageKind};

static THUMB_HREF: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"/(?:post/show|posts)/(\d+)").ok());

static SIMILARITY_TEXT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\d+)%\s*similar").ok());

static NOTICE_TAG: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[?&]tags=[^&]*[:%](\d+)").ok());

/// Where on the page a preview was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewSection {
    /// Previews of the parent and its other children.
    ParentPreview,
    /// Previews of the current post's children.
    ChildrenPreview,
    /// Search results on IQDB, upload and "similar" pages.
    SimilarList,
    /// Any other post listing on a post page.
    RelatedList,
}

/// A post preview element announced by the host page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewAnchor {
    pub section: PreviewSection,
    /// `data-id` attribute.
    pub data_id: Option<String>,
    /// Element id, `p<id>` on Moebooru listings.
    pub element_id: Option<String>,
    /// `href` of the thumbnail link.
    pub thumb_href: Option<String>,
    /// Whether the element contains a rendered preview image.
    pub has_preview_image: bool,
    /// Text of the similarity badge, e.g. "93% similar".
    pub similarity_text: Option<String>,
    /// Whether a compare link was already inserted.
    pub has_compare_link: bool,
}

impl PreviewAnchor {
    pub fn new(section: PreviewSection) -> Self {
        Self {
            section,
            data_id: None,
            element_id: None,
            thumb_href: None,
            has_preview_image: true,
            similarity_text: None,
            has_compare_link: false,
        }
    }

    pub fn with_data_id(mut self, id: impl Into<String>) -> Self {
        self.data_id = Some(id.into());
        self
    }

    pub fn with_element_id(mut self, id: impl Into<String>) -> Self {
        self.element_id = Some(id.into());
        self
    }

    pub fn with_thumb_href(mut self, href: impl Into<String>) -> Self {
        self.thumb_href = Some(href.into());
        self
    }

    pub fn with_similarity_text(mut self, text: impl Into<String>) -> Self {
        self.similarity_text = Some(text.into());
        self
    }

    /// Post id from `data-id`, then a `p<digits>` element id, then the thumbnail link.
    pub fn post_id(&self) -> Option<String> {
        if let Some(id) = self.data_id.as_deref().filter(|id| !id.is_empty()) {
            return Some(id.to_string());
        }
        if let Some(id) = self
            .element_id
            .as_deref()
            .and_then(|id| id.strip_prefix('p'))
            .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
        {
            return Some(id.to_string());
        }
        let href = self.thumb_href.as_deref()?;
        THUMB_HREF
            .as_ref()?
            .captures(href)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Score parsed from the similarity badge.
    pub fn similarity(&self) -> Option<u32> {
        let text = self.similarity_text.as_deref()?;
        SIMILARITY_TEXT
            .as_ref()?
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// A parent/child notice link, e.g. `/posts?tags=parent:123`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeLink {
    pub href: String,
}

impl NoticeLink {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }

    pub fn post_id(&self) -> Option<String> {
        NOTICE_TAG
            .as_ref()?
            .captures(&self.href)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn is_parent(&self) -> bool {
        self.href.contains("parent:")
    }
}

/// Snapshot of the candidate-bearing parts of the host page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePreviews {
    pub anchors: Vec<PreviewAnchor>,
    pub notices: Vec<NoticeLink>,
    /// Parent id of the current post as published by the page.
    pub parent_id: Option<String>,
}

impl PagePreviews {
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty() && self.notices.is_empty()
    }
}

/// Where a "compare »" link should be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareLink {
    /// Index into the anchor slice that was planned.
    pub anchor: usize,
    pub post_id: String,
}

fn accepts_links(context: &PageContext, section: PreviewSection) -> bool {
    match (context.site.is_moebooru(), context.kind) {
        (true, PageKind::Similar) => section == PreviewSection::SimilarList,
        (true, _) => false,
        (false, PageKind::IqdbQuery | PageKind::Upload) => section == PreviewSection::SimilarList,
        (false, _) => section != PreviewSection::SimilarList,
    }
}

/// Plans compare links for newly announced previews.
///
/// Skips the current post, anchors without a post id and anchors that already
/// carry a link.
pub fn plan_compare_links(context: &PageContext, anchors: &[PreviewAnchor]) -> Vec<CompareLink> {
    anchors
        .iter()
        .enumerate()
        .filter(|(_, anchor)| !anchor.has_compare_link && accepts_links(context, anchor.section))
        .filter_map(|(index, anchor)| {
            let post_id = anchor.post_id()?;
            if context.post_id.as_deref() == Some(post_id.as_str()) {
                return None;
            }
            Some(CompareLink {
                anchor: index,
                post_id,
            })
        })
        .collect()
}
