use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State as AxumState,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;

use crate::error::AppError;
use crate::gateway::prompt::compose;
use crate::gateway::types::{ContentType, GenerationRequest, GenerationResult, ResponseMetadata};
use crate::provider::{CompletionBackend, CompletionOptions};

/// Shared state for the gateway HTTP server.
#[derive(Clone)]
pub struct GatewayState {
    pub backend: Arc<dyn CompletionBackend>,
    pub options: CompletionOptions,
}

/// Build the gateway router. Split out from `start_server` so tests can
/// drive it without binding a socket.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/ai", post(generate))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Start the gateway HTTP server.
///
/// Returns once the shutdown signal fires and in-flight requests drain.
pub async fn start_server(
    addr: SocketAddr,
    state: GatewayState,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), AppError> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Gateway listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            // Wait until the shutdown signal is sent
            let _ = shutdown_rx.changed().await;
            tracing::info!("Gateway shutting down");
        })
        .await?;

    Ok(())
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "service": "workspace-ai" }))
}

#[derive(Debug, Deserialize)]
struct GenerateBody {
    prompt: Option<String>,
    #[serde(rename = "type")]
    content_type: Option<String>,
    context: Option<String>,
}

/// POST /api/ai — generate content for one prompt.
///
/// The handler is stateless: no transcript survives across calls. Input
/// validation happens before any provider I/O; upstream failures are
/// converted to a stable error envelope and logged, never leaked raw.
async fn generate(
    AxumState(state): AxumState<Arc<GatewayState>>,
    Json(body): Json<GenerateBody>,
) -> impl IntoResponse {
    let content_type = body
        .content_type
        .as_deref()
        .map(ContentType::from_tag)
        .unwrap_or_default();

    let request = match GenerationRequest::new(
        body.prompt.as_deref().unwrap_or(""),
        content_type,
        body.context,
    ) {
        Ok(r) => r,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "Prompt is required" })),
            );
        }
    };

    let messages = compose(&request, &[]);

    match state.backend.complete(&messages, &state.options).await {
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
            (
                StatusCode::OK,
                Json(serde_json::to_value(&result).unwrap_or_default()),
            )
        }
        Err(e) => {
            tracing::error!(content_type = content_type.as_tag(), "AI API error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to generate AI response" })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use crate::provider::{ChatMessage, Completion};

    struct StubBackend {
        reply: Result<String, String>,
    }

    #[async_trait::async_trait]
    impl CompletionBackend for StubBackend {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            options: &CompletionOptions,
        ) -> Result<Completion, AppError> {
            match &self.reply {
                Ok(text) => Ok(Completion {
                    text: text.clone(),
                    total_tokens: Some(12),
                    model: options.model.clone(),
                }),
                Err(msg) => Err(AppError::Upstream(msg.clone())),
            }
        }
    }

    fn app(reply: Result<String, String>) -> Router {
        router(GatewayState {
            backend: Arc::new(StubBackend { reply }),
            options: CompletionOptions::default(),
        })
    }

    async fn post_ai(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/ai")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn test_empty_prompt_is_400() {
        let (status, body) = post_ai(
            app(Ok("unused".into())),
            serde_json::json!({ "prompt": "", "type": "table" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "Prompt is required" }));
    }

    #[tokio::test]
    async fn test_missing_prompt_is_400() {
        let (status, body) = post_ai(app(Ok("unused".into())), serde_json::json!({})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Prompt is required");
    }

    #[tokio::test]
    async fn test_text_generation_round_trip() {
        let (status, body) = post_ai(
            app(Ok("apple, banana, cherry".into())),
            serde_json::json!({ "prompt": "list 3 fruits", "type": "text" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "apple, banana, cherry");
        assert_eq!(body["type"], "text");
        assert_eq!(body["metadata"]["tokens"], 12);
        assert_eq!(body["metadata"]["model"], "gpt-4");
        assert!(body["metadata"]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_missing_type_defaults_to_text() {
        let (status, body) = post_ai(
            app(Ok("hello".into())),
            serde_json::json!({ "prompt": "hi" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "text");
    }

    #[tokio::test]
    async fn test_unknown_type_defaults_to_text() {
        let (status, body) = post_ai(
            app(Ok("hello".into())),
            serde_json::json!({ "prompt": "hi", "type": "chart" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "text");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_500_with_stable_envelope() {
        let (status, body) = post_ai(
            app(Err("provider exploded: secret internals".into())),
            serde_json::json!({ "prompt": "hi", "type": "workflow" }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({ "error": "Failed to generate AI response" })
        );
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Ok("unused".into()))
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
