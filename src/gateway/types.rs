use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::validation::require_non_empty;

// =============================================================================
// ContentType — which output shape the caller asked for
// =============================================================================

/// Closed set of generation targets. Each variant selects both the prompt
/// template (see `gateway::prompt`) and the response decoder (see
/// `gateway::interpret`), so there is exactly one place per concern that
/// branches on the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Table,
    Workflow,
    Visualization,
}

impl ContentType {
    /// Parse from the wire tag. Unknown or missing tags fall back to `Text`.
    pub fn from_tag(s: &str) -> Self {
        match s {
            "table" => ContentType::Table,
            "workflow" => ContentType::Workflow,
            "visualization" => ContentType::Visualization,
            _ => ContentType::Text,
        }
    }

    /// Serialize to the wire tag.
    pub fn as_tag(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Table => "table",
            ContentType::Workflow => "workflow",
            ContentType::Visualization => "visualization",
        }
    }

    /// Per-type schema instruction appended to the base system prompt.
    pub fn schema_instruction(&self) -> &'static str {
        match self {
            ContentType::Workflow => {
                " Create a detailed workflow with clear steps. Return as JSON array \
                 with id, title, description, order, estimatedTime, and dependencies fields."
            }
            ContentType::Table => {
                " Create a table with headers and rows. Return as JSON object with \
                 headers array and rows array."
            }
            ContentType::Visualization => {
                " Suggest a visualization type and provide chart data. Return as JSON \
                 with type, data, and config fields."
            }
            ContentType::Text => " Provide helpful and informative responses.",
        }
    }
}

// =============================================================================
// Request / result records
// =============================================================================

/// One user-triggered generation request. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub content_type: ContentType,
    pub context: Option<String>,
}

impl GenerationRequest {
    /// Validate and construct. An empty-after-trim prompt is rejected here,
    /// before anything touches the network.
    pub fn new(
        prompt: &str,
        content_type: ContentType,
        context: Option<String>,
    ) -> Result<Self, AppError> {
        require_non_empty("prompt", prompt)?;
        Ok(Self {
            prompt: prompt.trim().to_string(),
            content_type,
            context,
        })
    }
}

/// Usage metadata attached to every completed generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u32>,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

/// One completed generation: the raw model output plus metadata.
/// Created once per request, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub content: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub metadata: ResponseMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for ct in [
            ContentType::Text,
            ContentType::Table,
            ContentType::Workflow,
            ContentType::Visualization,
        ] {
            assert_eq!(ContentType::from_tag(ct.as_tag()), ct);
        }
    }

    #[test]
    fn test_unknown_tag_defaults_to_text() {
        assert_eq!(ContentType::from_tag("chart"), ContentType::Text);
        assert_eq!(ContentType::from_tag(""), ContentType::Text);
    }

    #[test]
    fn test_request_rejects_blank_prompt() {
        let err = GenerationRequest::new("   ", ContentType::Text, None).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_request_trims_prompt() {
        let req = GenerationRequest::new("  hello  ", ContentType::Table, None).unwrap();
        assert_eq!(req.prompt, "hello");
        assert_eq!(req.content_type, ContentType::Table);
    }
}
