pub mod openai;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Literal sentinel returned when the provider produced no usable text.
/// Kept as valid output rather than an error so downstream code treats
/// "provider returned nothing" uniformly with "provider returned text".
pub const NO_RESPONSE: &str = "No response generated";

// =============================================================================
// Chat messages
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a chat-completion conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// =============================================================================
// Completion options & result
// =============================================================================

/// Bounded request parameters for one completion call.
///
/// Out-of-range values are passed through as-is; the provider is
/// authoritative for numeric validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionOptions {
    pub const DEFAULT_MODEL: &'static str = "gpt-4";
    pub const DEFAULT_MAX_TOKENS: u32 = 2000;
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_string(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            temperature: Self::DEFAULT_TEMPERATURE,
        }
    }
}

/// Raw outcome of one completion call: the first choice's text verbatim,
/// plus whatever usage metadata the provider reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub total_tokens: Option<u32>,
    pub model: String,
}

// =============================================================================
// CompletionBackend trait
// =============================================================================

/// Abstraction over chat-completion providers.
///
/// Exactly one outbound call per invocation: no retry, no caching, no
/// rate-limit handling. A failed call surfaces as `AppError::Upstream`
/// and is fatal for that request only.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<Completion, AppError>;
}
