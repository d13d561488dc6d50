//! Minimal Anthropic Messages API client.
//!
//! One endpoint, one blocking exchange per run: `POST /v1/messages`. There is
//! deliberately no retry layer and no streaming; a failed call surfaces as a
//! service error and the pipeline aborts before mutating anything.

pub mod types;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiErrorObject, OrganizerError, Result};
use types::{MessagesCreateRequest, MessagesCreateResponse};

pub const ANTHROPIC_DEFAULT_BASE: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const HDR_ANTHROPIC_VERSION: &str = "anthropic-version";
pub const HDR_X_API_KEY: &str = "x-api-key";

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    api_base: String,
    version: String,
    api_key: Option<String>,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_base: ANTHROPIC_DEFAULT_BASE.into(),
            version: ANTHROPIC_VERSION.into(),
            api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
        }
    }
}

impl AnthropicConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Validates that an API key is present.
    ///
    /// # Errors
    ///
    /// Returns an error if no key was supplied via the builder or the
    /// `ANTHROPIC_API_KEY` environment variable.
    pub fn validate_auth(&self) -> Result<()> {
        if self.api_key.is_none() {
            return Err(OrganizerError::Config(
                "Missing Anthropic credentials: pass --api-key or set ANTHROPIC_API_KEY".into(),
            ));
        }
        Ok(())
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut h = HeaderMap::new();
        h.insert(
            HDR_ANTHROPIC_VERSION,
            HeaderValue::from_str(&self.version)
                .map_err(|e| OrganizerError::Config(format!("Invalid version header: {e}")))?,
        );
        if let Some(key) = &self.api_key {
            h.insert(
                HDR_X_API_KEY,
                HeaderValue::from_str(key)
                    .map_err(|e| OrganizerError::Config(format!("Invalid API key: {e}")))?,
            );
        }
        Ok(h)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

/// Anthropic API client scoped to the Messages endpoint.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: AnthropicConfig,
}

impl Default for Client {
    fn default() -> Self {
        Self::with_config(AnthropicConfig::default())
    }
}

impl Client {
    /// Creates a client with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the reqwest client cannot be built.
    #[must_use]
    pub fn with_config(config: AnthropicConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(5))
                .timeout(std::time::Duration::from_secs(600))
                .build()
                .expect("reqwest client"),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    /// Creates a message: one request, one decoded response.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication is missing, the request fails to
    /// send, the API returns a non-2xx status, or the body fails to decode.
    pub async fn create_message(
        &self,
        req: MessagesCreateRequest,
    ) -> Result<MessagesCreateResponse> {
        self.config.validate_auth()?;

        let response = self
            .http
            .post(self.config.url("/v1/messages"))
            .headers(self.config.headers()?)
            .json(&req)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = %status, bytes = body.len(), "messages response");

        if !status.is_success() {
            return Err(OrganizerError::Api(deserialize_api_error(status, &body)));
        }

        serde_json::from_slice(&body).map_err(|e| {
            OrganizerError::Decode(format!("{}: {}", e, String::from_utf8_lossy(&body)))
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: String,
}

fn deserialize_api_error(status: StatusCode, body: &[u8]) -> ApiErrorObject {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => ApiErrorObject {
            r#type: envelope.error.kind,
            message: envelope.error.message,
            status: status.as_u16(),
        },
        Err(_) => ApiErrorObject {
            r#type: None,
            message: String::from_utf8_lossy(body).into_owned(),
            status: status.as_u16(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_headers_exist() {
        let cfg = AnthropicConfig::new().with_api_key("k123");
        let h = cfg.headers().unwrap();
        assert!(h.contains_key(HDR_ANTHROPIC_VERSION));
        assert!(h.contains_key(HDR_X_API_KEY));
    }

    #[test]
    fn validate_auth_missing() {
        let cfg = AnthropicConfig {
            api_base: "test".into(),
            version: "test".into(),
            api_key: None,
        };
        assert!(cfg.validate_auth().is_err());
    }

    #[test]
    fn api_error_envelope_decodes() {
        let body = br#"{"error": {"type": "invalid_request_error", "message": "bad"}}"#;
        let err = deserialize_api_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.r#type.as_deref(), Some("invalid_request_error"));
        assert_eq!(err.message, "bad");
        assert_eq!(err.status, 400);
    }

    #[test]
    fn api_error_falls_back_to_raw_body() {
        let err = deserialize_api_error(StatusCode::BAD_GATEWAY, b"upstream down");
        assert!(err.r#type.is_none());
        assert_eq!(err.message, "upstream down");
    }
}
