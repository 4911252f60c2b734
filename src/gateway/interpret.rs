//! Structured decoding of model output.
//!
//! The model is asked for exact JSON shapes but is under no obligation to
//! comply, so every decode is an attempt: malformed JSON, a wrong top-level
//! shape, or an invariant violation degrades to the original raw text
//! tagged as prose. Nothing in this module errors or panics on bad input.

use serde::Serialize;

use super::types::ContentType;

// =============================================================================
// Parsed shapes
// =============================================================================

/// A decoded table: every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSpec {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// One decoded workflow step. `order` values are unique within a workflow
/// and drive display sequencing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowStep {
    pub id: String,
    pub title: String,
    pub description: String,
    pub order: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    pub dependencies: Vec<String>,
}

/// A decoded visualization suggestion. `data` and `config` stay opaque;
/// the gateway never interprets chart payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationSpec {
    pub chart_kind: String,
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ParsedShape {
    Table(TableSpec),
    Workflow { steps: Vec<WorkflowStep> },
    Visualization(VisualizationSpec),
}

/// Outcome of interpreting raw model output against a content type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Interpreted {
    /// Output matched the requested schema and all invariants held.
    Parsed(ParsedShape),
    /// Output did not decode; the original text is preserved for plain
    /// rendering. This is a deliberate fallback, not an error.
    Prose(String),
}

impl Interpreted {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Interpreted::Parsed(_))
    }
}

// =============================================================================
// interpret
// =============================================================================

/// Decode `raw` according to `content_type`.
///
/// Pure and deterministic: same input always yields the same output, no
/// hidden state. `Text` never attempts a parse.
pub fn interpret(raw: &str, content_type: ContentType) -> Interpreted {
    let parsed = match content_type {
        ContentType::Text => None,
        ContentType::Table => decode_table(raw).map(ParsedShape::Table),
        ContentType::Workflow => decode_workflow(raw).map(|steps| ParsedShape::Workflow { steps }),
        ContentType::Visualization => decode_visualization(raw).map(ParsedShape::Visualization),
    };

    match parsed {
        Some(shape) => Interpreted::Parsed(shape),
        None => Interpreted::Prose(raw.to_string()),
    }
}

impl crate::gateway::types::GenerationResult {
    /// Interpret this result's raw content against its own content type.
    pub fn interpret(&self) -> Interpreted {
        interpret(&self.content, self.content_type)
    }
}

// =============================================================================
// Per-shape decoders
// =============================================================================

/// Helper: a JSON value that must be a string.
fn as_string(v: &serde_json::Value) -> Option<String> {
    v.as_str().map(String::from)
}

/// Helper: an optional string field, rejecting present-but-wrong-typed values.
fn opt_string_field(v: &serde_json::Value, key: &str) -> Option<Option<String>> {
    match v.get(key) {
        None | Some(serde_json::Value::Null) => Some(None),
        Some(other) => other.as_str().map(|s| Some(s.to_string())),
    }
}

/// Helper: an array field where every element must be a string.
fn string_array(v: &serde_json::Value) -> Option<Vec<String>> {
    v.as_array()?.iter().map(as_string).collect()
}

fn decode_table(raw: &str) -> Option<TableSpec> {
    let value: serde_json::Value = serde_json::from_str(raw.trim()).ok()?;

    let headers = string_array(value.get("headers")?)?;
    if headers.is_empty() {
        return None;
    }

    let mut rows = Vec::new();
    for row in value.get("rows")?.as_array()? {
        let cells = string_array(row)?;
        // A mismatched row is a decode failure, never a silent truncation
        if cells.len() != headers.len() {
            return None;
        }
        rows.push(cells);
    }

    let title = opt_string_field(&value, "title")?;

    Some(TableSpec {
        headers,
        rows,
        title,
    })
}

fn decode_workflow(raw: &str) -> Option<Vec<WorkflowStep>> {
    let value: serde_json::Value = serde_json::from_str(raw.trim()).ok()?;
    let items = value.as_array()?;

    let mut steps = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let order = match item.get("order") {
            // Present: must be a positive integer
            Some(o) => u32::try_from(o.as_u64()?).ok().filter(|o| *o >= 1)?,
            // Absent: fall back to the positional index, 1-based
            None => (index as u32) + 1,
        };

        let dependencies = match item.get("dependencies") {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(deps) => string_array(deps)?,
        };

        steps.push(WorkflowStep {
            id: as_string(item.get("id")?)?,
            title: as_string(item.get("title")?)?,
            description: as_string(item.get("description")?)?,
            order,
            estimated_time: opt_string_field(item, "estimatedTime")?,
            dependencies,
        });
    }

    // Orders must form a total order: duplicates break display sequencing
    let mut seen = std::collections::HashSet::new();
    if !steps.iter().all(|s| seen.insert(s.order)) {
        return None;
    }

    steps.sort_by_key(|s| s.order);
    Some(steps)
}

fn decode_visualization(raw: &str) -> Option<VisualizationSpec> {
    let value: serde_json::Value = serde_json::from_str(raw.trim()).ok()?;

    let chart_kind = as_string(value.get("type")?)?;
    let data = value.get("data")?.clone();
    let config = match value.get("config") {
        None | Some(serde_json::Value::Null) => None,
        Some(c) => Some(c.clone()),
    };

    Some(VisualizationSpec {
        chart_kind,
        data,
        config,
    })
}

// =============================================================================
// Tests
// =============================================================================
