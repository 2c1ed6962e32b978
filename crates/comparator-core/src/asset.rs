//! Image metadata probing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::slot::Dimensions;

/// What the comparator learns about an image before showing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub url: String,
    pub dimensions: Dimensions,
}

/// Checks that a URL points at a decodable image.
///
/// Implementations return `ComparatorError::Asset` whether the bytes could
/// not be fetched or could not be decoded.
#[async_trait]
pub trait AssetProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<AssetInfo>;
}
