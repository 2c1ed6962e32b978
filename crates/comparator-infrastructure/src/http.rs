//! Shared HTTP plumbing for the booru backends.

use comparator_core::config::HttpConfig;
use comparator_core::error::{ComparatorError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Builds the client every backend and the asset probe share.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs.max(1)))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| ComparatorError::internal(format!("Failed to build HTTP client: {}", e)))
}

pub(crate) fn request_error(url: &str, err: reqwest::Error) -> ComparatorError {
    ComparatorError::network(
        err.status().map(|s| s.as_u16()),
        format!("Request to {} failed: {}", url, err),
    )
}

/// GETs `url` and decodes a JSON body. Non-success statuses become `Network` errors.
pub(crate) async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    let response = client
        .get(url)
        .header("accept", "application/json")
        .send()
        .await
        .map_err(|e| request_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ComparatorError::network(
            Some(status.as_u16()),
            format!("{} returned {}", url, status),
        ));
    }

    response.json::<T>().await.map_err(|e| {
        ComparatorError::network(
            Some(status.as_u16()),
            format!("Failed to parse response from {}: {}", url, e),
        )
    })
}

/// GETs `url` and returns the raw body.
pub(crate) async fn get_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| request_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ComparatorError::network(
            Some(status.as_u16()),
            format!("{} returned {}", url, status),
        ));
    }

    let bytes = response.bytes().await.map_err(|e| request_error(url, e))?;
    Ok(bytes.to_vec())
}

/// Converts a failed best-effort query into "no answer", logging why.
pub(crate) fn best_effort<T>(what: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("[HttpBackend] {} failed: {}", what, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_from_defaults() {
        assert!(build_client(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn test_best_effort_swallows_errors() {
        let failed: Result<u32> = Err(ComparatorError::network(Some(500), "boom"));
        assert_eq!(best_effort("lookup", failed), None);
        assert_eq!(best_effort("lookup", Ok(3)), Some(3));
    }
}
