// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

// HTTP boundary to the generation backend.
//
// Responsibilities:
// - POST feature payloads as JSON and hand back the response byte stream
// - Map HTTP status codes onto the user-facing error taxonomy
//   (401 invalid key, 413 element too large, other non-2xx generic)
// - Health probe against /api/ping
//
// The backend itself is a black box; callers depend on the
// `BackendClient` trait so tests never touch a real HTTP client.

use crate::feature::{Feature, GenerationRequest, PING_ENDPOINT};
use crate::notify::ErrorKey;
use bytes::Bytes;
use futures_util::TryStreamExt;
use std::pin::Pin;
use tokio_stream::Stream;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure while reading the response body mid-stream.
#[derive(Debug, Clone, thiserror::Error)]
#[error("stream read failed: {0}")]
pub struct TransportError(pub String);

/// Errors raised at the HTTP boundary, before any delta is consumed.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("incorrect API key provided")]
    InvalidApiKey,

    #[error("the selected element is too large")]
    PayloadTooLarge,

    #[error("backend returned status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(String),
}

impl ApiError {
    /// The message key carried on the error lifecycle notification.
    pub fn error_key(&self) -> ErrorKey {
        match self {
            ApiError::InvalidApiKey => ErrorKey::InvalidApiKey,
            ApiError::PayloadTooLarge => ErrorKey::PayloadTooLarge,
            ApiError::Status(_) | ApiError::Transport(_) => ErrorKey::Failed,
        }
    }

    /// Classify a response status. `None` means the stream may be read.
    pub fn from_status(status: u16) -> Option<ApiError> {
        match status {
            401 => Some(ApiError::InvalidApiKey),
            413 => Some(ApiError::PayloadTooLarge),
            s if !(200..300).contains(&s) => Some(ApiError::Status(s)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Trait: BackendClient (dependency injection point)
// ---------------------------------------------------------------------------

/// Response body as an ordered sequence of raw chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Abstraction over the HTTP client that talks to the generation backend.
#[async_trait::async_trait]
pub trait BackendClient: Send + Sync {
    /// Start a streaming generation. Returns the body stream once the
    /// response status has been vetted.
    async fn start_stream(
        &self,
        feature: Feature,
        request: &GenerationRequest,
    ) -> Result<ByteStream, ApiError>;

    /// Probe the backend health endpoint.
    async fn ping(&self) -> Result<(), ApiError>;
}

// ---------------------------------------------------------------------------
// Reqwest implementation
// ---------------------------------------------------------------------------

/// `BackendClient` over reqwest.
pub struct HttpBackendClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpBackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, http }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl BackendClient for HttpBackendClient {
    async fn start_stream(
        &self,
        feature: Feature,
        request: &GenerationRequest,
    ) -> Result<ByteStream, ApiError> {
        let url = self.url(feature.endpoint());
        tracing::debug!(%url, feature = %feature, "sending generation request");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if let Some(err) = ApiError::from_status(response.status().as_u16()) {
            return Err(err);
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| TransportError(e.to_string()));
        Ok(Box::pin(stream))
    }

    async fn ping(&self) -> Result<(), ApiError> {
        let response = self
            .http
            .get(self.url(PING_ENDPOINT))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        match ApiError::from_status(response.status().as_u16()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_maps_to_invalid_api_key() {
        assert!(matches!(
            ApiError::from_status(401),
            Some(ApiError::InvalidApiKey)
        ));
    }

    #[test]
    fn status_413_maps_to_payload_too_large() {
        assert!(matches!(
            ApiError::from_status(413),
            Some(ApiError::PayloadTooLarge)
        ));
    }

    #[test]
    fn other_non_2xx_is_generic_status_error() {
        assert!(matches!(
            ApiError::from_status(500),
            Some(ApiError::Status(500))
        ));
        assert!(matches!(
            ApiError::from_status(404),
            Some(ApiError::Status(404))
        ));
    }

    #[test]
    fn success_statuses_pass() {
        assert!(ApiError::from_status(200).is_none());
        assert!(ApiError::from_status(201).is_none());
    }

    #[test]
    fn error_keys_match_taxonomy() {
        assert_eq!(ApiError::InvalidApiKey.error_key(), ErrorKey::InvalidApiKey);
        assert_eq!(
            ApiError::PayloadTooLarge.error_key(),
            ErrorKey::PayloadTooLarge
        );
        assert_eq!(ApiError::Status(502).error_key(), ErrorKey::Failed);
        assert_eq!(
            ApiError::Transport("offline".into()).error_key(),
            ErrorKey::Failed
        );
    }

    #[test]
    fn base_url_trailing_slash_normalized() {
        let client = HttpBackendClient::new("https://api.testcraft.app/");
        assert_eq!(
            client.url(Feature::TestIdeas.endpoint()),
            "https://api.testcraft.app/api/generate-ideas"
        );
    }
}
