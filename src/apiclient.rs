//! UI-side HTTP client for the gateway.
//!
//! This is the `generateContent` contract: one POST to `/api/ai` per call,
//! surfacing the server's error string on failure. Views typically pair a
//! `GatewayClient` with their own `GenerationSession`.

use serde::Serialize;

use crate::error::AppError;
use crate::gateway::types::{ContentType, GenerationRequest, GenerationResult};

/// Convert any displayable error into `AppError::Upstream`.
fn gateway_err(e: impl std::fmt::Display) -> AppError {
    AppError::Upstream(e.to_string())
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    prompt: &'a str,
    #[serde(rename = "type")]
    content_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

/// HTTP client that wraps the gateway's `/api/ai` endpoint.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    /// Create a new `GatewayClient` for the given gateway base URL.
    ///
    /// The underlying `reqwest::Client` is configured with a 60-second
    /// timeout; completion calls routinely take tens of seconds.
    pub fn new(base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("failed to build reqwest client");

        Self { http, base_url }
    }

    /// `POST /api/ai` — generate content for one prompt.
    ///
    /// Validates the prompt locally before any network I/O, then surfaces
    /// either the decoded result or the server's error string.
    pub async fn generate(
        &self,
        prompt: &str,
        content_type: ContentType,
        context: Option<&str>,
    ) -> Result<GenerationResult, AppError> {
        let request =
            GenerationRequest::new(prompt, content_type, context.map(String::from))?;

        let body = GenerateBody {
            prompt: &request.prompt,
            content_type: request.content_type.as_tag(),
            context: request.context.as_deref(),
        };

        let response = self
            .http
            .post(format!("{}/api/ai", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(gateway_err)?;

        let status = response.status();
        let payload: serde_json::Value = response.json().await.map_err(gateway_err)?;

        // Error envelope: `{ "error": "..." }`, surfaced verbatim
        if let Some(message) = payload.get("error").and_then(|e| e.as_str()) {
            return Err(AppError::Upstream(message.to_string()));
        }
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Gateway returned HTTP {status}"
            )));
        }

        serde_json::from_value(payload).map_err(AppError::Serde)
    }
}
