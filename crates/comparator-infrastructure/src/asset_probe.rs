//! `AssetProbe` over HTTP.

use async_trait::async_trait;
use comparator_core::asset::{AssetInfo, AssetProbe};
use comparator_core::error::{ComparatorError, Result};
use comparator_core::slot::Dimensions;
use image::ImageReader;
use reqwest::Client;
use std::io::Cursor;

use crate::http;

/// Downloads an image and reads its header to confirm it decodes.
#[derive(Debug, Clone)]
pub struct HttpAssetProbe {
    client: Client,
}

impl HttpAssetProbe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetProbe for HttpAssetProbe {
    async fn probe(&self, url: &str) -> Result<AssetInfo> {
        let bytes = http::get_bytes(&self.client, url)
            .await
            .map_err(|e| ComparatorError::asset(url, e.to_string()))?;
        let dimensions = decode_dimensions(url, &bytes)?;
        tracing::debug!(
            "[HttpAssetProbe] {} is {}x{}",
            url,
            dimensions.width,
            dimensions.height
        );
        Ok(AssetInfo {
            url: url.to_string(),
            dimensions,
        })
    }
}

/// Reads the dimensions from an encoded image without decoding pixels.
pub fn decode_dimensions(url: &str, bytes: &[u8]) -> Result<Dimensions> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ComparatorError::asset(url, e.to_string()))?;
    if reader.format().is_none() {
        return Err(ComparatorError::asset(url, "unrecognized image format"));
    }
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ComparatorError::asset(url, e.to_string()))?;
    Ok(Dimensions::new(width, height))
}
