use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::Site;
use crate::error::{ComparatorError, Result};
use crate::slot::{ImageId, ImageSlot};

static DANBOORU_PAGE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"/(posts|uploads)/\d+($|/assets/\d+)").ok());

static DANBOORU_POST_PATH: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^/posts/(\d+)").ok());

static MOEBOORU_PAGE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/post/(show|similar)").ok());

static MOEBOORU_POST_PATH: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"/(?:show|similar)/(\d+)").ok());

fn capture(re: &Lazy<Option<Regex>>, text: &str) -> Option<String> {
    re.as_ref()?
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn matches(re: &Lazy<Option<Regex>>, text: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(text))
}

/// Address of the page the comparator runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    pub fn parse(href: &str) -> Result<Self> {
        let url = Url::parse(href)
            .map_err(|e| ComparatorError::invalid_input(format!("Invalid page URL {}: {}", href, e)))?;
        Ok(Self { url })
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Percent-decoded value of a query parameter.
    pub fn query(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.trim().is_empty())
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

/// Values the host page exposes outside the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageHints {
    /// `meta[name=post-id]`, or the post id field of a search form.
    pub post_id: Option<String>,
    /// The URL field of a search form.
    pub search_url: Option<String>,
}

impl PageHints {
    fn post_id(&self) -> Option<String> {
        non_blank(self.post_id.as_deref())
    }

    fn search_url(&self) -> Option<String> {
        non_blank(self.search_url.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Kind of page the comparator was opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// A regular post page.
    Post,
    /// Danbooru upload page.
    Upload,
    /// Danbooru IQDB reverse-search page.
    IqdbQuery,
    /// Moebooru "similar posts" page.
    Similar,
}

impl PageKind {
    /// Whether the page lists visually similar posts rather than relatives.
    pub fn is_search(self) -> bool {
        !matches!(self, PageKind::Post)
    }
}

/// Everything the comparator knows about the page it runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub site: Site,
    pub kind: PageKind,
    pub post_id: Option<String>,
    pub search_url: Option<String>,
}

impl PageContext {
    /// Recognizes comparable pages of `site`.
    pub fn detect(site: Site, location: &PageLocation, hints: &PageHints) -> Option<PageContext> {
        let path = location.path();
        let context = if site.is_moebooru() {
            if !matches(&MOEBOORU_PAGE, path) {
                return None;
            }
            let similar = path.starts_with("/post/similar");
            PageContext {
                site,
                kind: if similar { PageKind::Similar } else { PageKind::Post },
                post_id: capture(&MOEBOORU_POST_PATH, path),
                search_url: if similar {
                    location.query("url").or_else(|| hints.search_url())
                } else {
                    None
                },
            }
        } else if path.starts_with("/iqdb_queries") {
            PageContext {
                site,
                kind: PageKind::IqdbQuery,
                post_id: location.query("post_id").or_else(|| hints.post_id()),
                search_url: location.query("url").or_else(|| hints.search_url()),
            }
        } else if matches(&DANBOORU_PAGE, path) {
            let upload = path.starts_with("/uploads");
            PageContext {
                site,
                kind: if upload { PageKind::Upload } else { PageKind::Post },
                post_id: if upload {
                    hints.post_id()
                } else {
                    hints.post_id().or_else(|| capture(&DANBOORU_POST_PATH, path))
                },
                search_url: None,
            }
        } else {
            return None;
        };

        tracing::debug!(
            "[PageContext] Detected {:?} page on {} (post {:?})",
            context.kind,
            context.site,
            context.post_id
        );
        Some(context)
    }

    /// Id stored with the left slot.
    pub fn current_image_id(&self) -> ImageId {
        match (self.kind, &self.post_id) {
            (PageKind::Upload, _) => ImageId::Upload,
            (PageKind::Similar, _) => ImageId::Similar,
            (PageKind::IqdbQuery, None) => ImageId::Iqdb,
            (_, Some(id)) => ImageId::post(id.clone()),
            (PageKind::Post, None) => ImageId::Unknown,
        }
    }

    /// Header label for the current image.
    pub fn current_label(&self) -> String {
        match (self.kind, &self.post_id) {
            (PageKind::Upload, _) => "Upload".to_string(),
            (PageKind::Similar, _) => "Similar".to_string(),
            (PageKind::IqdbQuery, None) => "IQDB".to_string(),
            (_, Some(id)) => format!("Post #{}", id),
            (PageKind::Post, None) => "Custom".to_string(),
        }
    }

    /// Label in front of the candidate selector.
    pub fn selector_label(&self) -> &'static str {
        if self.kind.is_search() {
            "Similar: "
        } else {
            "Related: "
        }
    }

    /// Builds the left slot from what the page currently shows.
    ///
    /// Search pages show the query image rather than a post.
    pub fn initial_left(&self, current_image_url: Option<String>) -> ImageSlot {
        let url = match self.kind {
            PageKind::IqdbQuery | PageKind::Similar => {
                self.search_url.clone().or(current_image_url)
            }
            PageKind::Post | PageKind::Upload => current_image_url,
        };
        match url {
            Some(url) => ImageSlot::new(self.current_image_id(), url),
            None => ImageSlot {
                id: self.current_image_id(),
                url: None,
                dimensions: None,
            },
        }
    }

    /// An IQDB page queried by post id shows no image until the post is resolved.
    pub fn needs_search_image(&self, left: &ImageSlot) -> bool {
        self.kind == PageKind::IqdbQuery && self.post_id.is_some() && left.is_empty()
    }
}
