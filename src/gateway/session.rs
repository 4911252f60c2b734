//! Per-view generation session.
//!
//! Each UI surface owns exactly one `GenerationSession`; sessions are never
//! shared and never outlive their view. The session holds the conversation
//! transcript for the text path (there is no process-wide history), and
//! fences completions with a monotonically increasing request counter so a
//! slow response can never overwrite a newer one.

use chrono::Utc;

use super::prompt::compose;
use super::types::{ContentType, GenerationRequest, GenerationResult, ResponseMetadata};
use crate::error::AppError;
use crate::provider::{ChatMessage, CompletionBackend, CompletionOptions};

/// Where the session currently is in its request lifecycle.
/// No phase is terminal; a new request can always re-trigger the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Handle for one in-flight request. A completion or failure is applied
/// only while its ticket is still the session's newest.
#[derive(Debug)]
pub struct RequestTicket {
    counter: u64,
    prompt: String,
    content_type: ContentType,
}

#[derive(Debug, Default)]
pub struct GenerationSession {
    phase: SessionPhase,
    last_result: Option<GenerationResult>,
    last_error: Option<String>,
    transcript: Vec<ChatMessage>,
    counter: u64,
}

impl GenerationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Most recent completed result. Kept across later errors so the UI can
    /// show stale content alongside an error message.
    pub fn last_result(&self) -> Option<&GenerationResult> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Prior transcript turns, text path only.
    pub fn history(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn clear_history(&mut self) {
        self.transcript.clear();
    }

    /// Enter `Loading` and issue a ticket for the new request. Any still
    /// in-flight older request becomes stale the moment this returns.
    pub fn begin(&mut self, request: &GenerationRequest) -> RequestTicket {
        self.counter += 1;
        self.phase = SessionPhase::Loading;
        RequestTicket {
            counter: self.counter,
            prompt: request.prompt.clone(),
            content_type: request.content_type,
        }
    }

    /// Apply a completed result. Returns false (and changes nothing) when
    /// the ticket is stale.
    pub fn complete(&mut self, ticket: RequestTicket, result: GenerationResult) -> bool {
        if ticket.counter != self.counter {
            tracing::debug!(
                stale = ticket.counter,
                current = self.counter,
                "Discarding stale completion"
            );
            return false;
        }

        // Only the text path carries a running transcript
        if ticket.content_type == ContentType::Text {
            self.transcript.push(ChatMessage::user(ticket.prompt));
            self.transcript
                .push(ChatMessage::assistant(result.content.clone()));
        }

        self.phase = SessionPhase::Success;
        self.last_result = Some(result);
        self.last_error = None;
        true
    }

    /// Apply a failed request. `last_result` keeps its previous value.
    /// Returns false (and changes nothing) when the ticket is stale.
    pub fn fail(&mut self, ticket: RequestTicket, message: impl Into<String>) -> bool {
        if ticket.counter != self.counter {
            tracing::debug!(
                stale = ticket.counter,
                current = self.counter,
                "Discarding stale failure"
            );
            return false;
        }

        self.phase = SessionPhase::Error;
        self.last_error = Some(message.into());
        true
    }

    /// Drive one full generation against a completion backend: compose the
    /// prompt (threading the transcript on the text path), make the single
    /// provider call, and apply the outcome to this session.
    pub async fn generate(
        &mut self,
        backend: &dyn CompletionBackend,
        options: &CompletionOptions,
        request: GenerationRequest,
    ) -> Result<GenerationResult, AppError> {
        let history: Vec<ChatMessage> = match request.content_type {
            ContentType::Text => self.transcript.clone(),
            _ => Vec::new(),
        };

        let ticket = self.begin(&request);
        let messages = compose(&request, &history);

        match backend.complete(&messages, options).await {
            Ok(completion) => {
                let result = GenerationResult {
                    content: completion.text,
                    content_type: request.content_type,
                    metadata: ResponseMetadata {
                        tokens: completion.total_tokens,
                        model: completion.model,
                        timestamp: Utc::now(),
                    },
                };
                self.complete(ticket, result.clone());
                Ok(result)
            }
            Err(e) => {
                self.fail(ticket, e.to_string());
                Err(e)
            }
        }
    }
}
