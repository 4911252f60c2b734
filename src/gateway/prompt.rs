use super::types::GenerationRequest;
use crate::provider::ChatMessage;

/// Base system instruction shared by every content type.
const BASE_SYSTEM_PROMPT: &str = "You are a helpful AI assistant integrated into a \
     Notion-like interface. Generate clear, concise, and well-structured content.";

/// Build the ordered message list for one generation request.
///
/// Layout: system message (base instruction + optional context + per-type
/// schema instruction), then any prior transcript turns, then the trimmed
/// user prompt. Pure function; validation already happened when the
/// `GenerationRequest` was constructed.
pub fn compose(request: &GenerationRequest, history: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut system = String::from(BASE_SYSTEM_PROMPT);
    if let Some(ref context) = request.context {
        if !context.trim().is_empty() {
            system.push_str(&format!(" Context: {}", context.trim()));
        }
    }
    system.push_str(request.content_type.schema_instruction());

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend_from_slice(history);
    messages.push(ChatMessage::user(request.prompt.clone()));
    messages
}
