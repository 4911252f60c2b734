use serde::{Deserialize, Serialize};

use super::{ChatMessage, Completion, CompletionBackend, CompletionOptions, NO_RESPONSE};
use crate::error::AppError;

/// Convert any displayable error into `AppError::Upstream`.
fn upstream_err(e: impl std::fmt::Display) -> AppError {
    AppError::Upstream(e.to_string())
}

// ============================================================================
// Wire types (OpenAI chat-completions)
// ============================================================================

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Usage {
    pub total_tokens: Option<u32>,
}

// ============================================================================
// OpenAiBackend
// ============================================================================

/// HTTP client for an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct OpenAiBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiBackend {
    /// Create a new backend with the given base URL and API key.
    ///
    /// The underlying `reqwest::Client` is configured with a 30-second timeout.
    pub fn new(base_url: String, api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build reqwest client");

        Self {
            http,
            base_url,
            api_key,
        }
    }
}

/// Pull the first choice's text out of a provider response.
///
/// Zero choices or empty content yields the `NO_RESPONSE` sentinel, not an
/// error. The requested model name is echoed back when the provider omits it.
fn extract_completion(resp: ChatCompletionResponse, requested_model: &str) -> Completion {
    let text = resp
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| NO_RESPONSE.to_string());

    Completion {
        text,
        total_tokens: resp.usage.and_then(|u| u.total_tokens),
        model: resp
            .model
            .unwrap_or_else(|| requested_model.to_string()),
    }
}

#[async_trait::async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<Completion, AppError> {
        let body = ChatCompletionBody {
            model: &options.model,
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let resp: ChatCompletionResponse = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(upstream_err)?
            .error_for_status()
            .map_err(upstream_err)?
            .json()
            .await
            .map_err(upstream_err)?;

        Ok(extract_completion(resp, &options.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> ChatCompletionResponse {
        serde_json::from_str(json).expect("wire response should decode")
    }

    #[test]
    fn test_extracts_first_choice_verbatim() {
        let resp = decode(
            r#"{"choices":[{"message":{"content":"  apple, banana, cherry\n"}},{"message":{"content":"second"}}],"usage":{"total_tokens":42},"model":"gpt-4-0613"}"#,
        );
        let c = extract_completion(resp, "gpt-4");

        // Text is never trimmed or reformatted
        assert_eq!(c.text, "  apple, banana, cherry\n");
        assert_eq!(c.total_tokens, Some(42));
        assert_eq!(c.model, "gpt-4-0613");
    }

    #[test]
    fn test_zero_choices_yields_sentinel() {
        let resp = decode(r#"{"choices":[]}"#);
        let c = extract_completion(resp, "gpt-4");

        assert_eq!(c.text, NO_RESPONSE);
        assert_eq!(c.total_tokens, None);
        assert_eq!(c.model, "gpt-4");
    }

    #[test]
    fn test_missing_choices_field_yields_sentinel() {
        let resp = decode(r#"{"usage":{"total_tokens":0}}"#);
        let c = extract_completion(resp, "gpt-4");
        assert_eq!(c.text, NO_RESPONSE);
    }

    #[test]
    fn test_empty_content_yields_sentinel() {
        let resp = decode(r#"{"choices":[{"message":{"content":""}}]}"#);
        let c = extract_completion(resp, "gpt-4");
        assert_eq!(c.text, NO_RESPONSE);

        let resp = decode(r#"{"choices":[{"message":{"content":null}}]}"#);
        let c = extract_completion(resp, "gpt-4");
        assert_eq!(c.text, NO_RESPONSE);
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let options = CompletionOptions::default();
        let body = ChatCompletionBody {
            model: &options.model,
            messages: &messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["model"], "gpt-4");
        assert_eq!(v["max_tokens"], 2000);
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][1]["role"], "user");
        assert_eq!(v["messages"][1]["content"], "hi");
    }
}
