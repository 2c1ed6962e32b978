//! HTTP implementations of `PostBackend`.
//!
//! # Module Structure
//!
//! - `danbooru`: `/posts` and `/iqdb_queries` JSON APIs
//! - `moebooru`: `/post.json` tag-search API shared by Yande.re and Konachan

mod danbooru;
mod moebooru;

pub use danbooru::{DanbooruBackend, DanbooruIqdbMatch, DanbooruPost};
pub use moebooru::{MoebooruBackend, MoebooruPost};

use comparator_core::error::{ComparatorError, Result};
use reqwest::Url;

/// Maximum number of posts requested per tag search.
pub(crate) const SEARCH_LIMIT: &str = "200";

pub(crate) fn endpoint(base_url: &str, path: &str, params: &[(&str, &str)]) -> Result<Url> {
    let raw = format!("{}{}", base_url.trim_end_matches('/'), path);
    Url::parse_with_params(&raw, params)
        .map_err(|e| ComparatorError::config(format!("Invalid endpoint {}: {}", raw, e)))
}
