//! Shared transport plumbing for the API clients.

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Maps a reqwest send error onto the crate's network error.
pub(crate) fn request_failed(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Network("request timeout".to_string())
    } else if e.is_connect() {
        Error::Network(format!("connection failed: {}", e))
    } else {
        Error::Network(format!("request failed: {}", e))
    }
}

/// Passes 2xx responses through; surfaces anything else as a remote API
/// error wrapping the status and response body unmodified.
pub(crate) async fn into_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(Error::remote_api(status.as_u16(), message))
}

/// Reads a successful response body as JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Network(format!("failed to read response: {}", e)))?;
    serde_json::from_str(&body)
        .map_err(|e| Error::remote_api(status, format!("unexpected response body: {}", e)))
}
