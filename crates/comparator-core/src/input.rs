//! Parsing of the "Enter ID or URL" field.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{ComparatorError, Result};
use crate::site::Site;

/// What a load request refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LoadTarget {
    /// A post on the session's origin.
    Post(String),
    /// A direct image URL.
    Url(String),
}

impl LoadTarget {
    /// Interprets user input.
    ///
    /// Digits are a post id, a post page URL of any supported origin is
    /// reduced to its id, and anything else must be an absolute URL.
    pub fn parse(input: &str) -> Result<LoadTarget> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ComparatorError::invalid_input(
                "Please enter a valid post ID or URL",
            ));
        }
        if input.chars().all(|c| c.is_ascii_digit()) {
            return Ok(LoadTarget::Post(input.to_string()));
        }
        if Site::is_post_url(input) {
            return Site::extract_post_id(input)
                .map(LoadTarget::Post)
                .ok_or_else(|| ComparatorError::invalid_input("Could not extract post ID from URL"));
        }
        Url::parse(input).map_err(|_| ComparatorError::invalid_input("Invalid URL format"))?;
        Ok(LoadTarget::Url(input.to_string()))
    }

    /// Post id, when the target is a post.
    pub fn post_id(&self) -> Option<&str> {
        match self {
            LoadTarget::Post(id) => Some(id),
            LoadTarget::Url(_) => None,
        }
    }

    /// Text to leave in the input field after a successful load.
    pub fn input_echo(&self) -> &str {
        match self {
            LoadTarget::Post(id) => id,
            LoadTarget::Url(_) => "",
        }
    }
}
