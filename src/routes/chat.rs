// Chat proxy route
// Forwards widget chat turns to the configured LLM provider and returns the
// reply in the Gemini envelope regardless of which provider answered
//
// Endpoints:
// - POST /v1/chat - Proxy one chat exchange

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::llm::{LlmClient, LlmError, LlmProvider};
use crate::models::ChatRequest;
use crate::AppState;

/// Error body returned to the widget for every failure case
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ErrorBody {
    fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            detail: None,
        }
    }

    fn with_detail(error: &str, detail: String) -> Self {
        Self {
            error: error.to_string(),
            detail: Some(detail),
        }
    }
}

/// POST /v1/chat - Proxy one chat exchange to the configured provider
async fn send_chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<ErrorBody>)> {
    let api_key = state.config.api_key().ok_or_else(|| {
        tracing::error!(
            "{} is not set in environment variables",
            state.config.key_env_var()
        );
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new("API key not configured")),
        )
    })?;

    // Reject malformed bodies before anything leaves the proxy
    let request: ChatRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!("Failed to parse chat request body: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::with_detail("Invalid request body", e.to_string())),
        )
    })?;

    request.validate().map_err(|e| {
        tracing::error!("Rejected chat request: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::with_detail("Invalid request body", e)),
        )
    })?;

    let llm = match state.config.provider {
        LlmProvider::Gemini => {
            LlmClient::gemini(api_key.to_string(), state.config.api_url().to_string())
        }
        LlmProvider::OpenRouter => {
            LlmClient::openrouter(api_key.to_string(), state.config.api_url().to_string())
        }
    };

    tracing::info!(
        "Proxying chat request with {} turns to {}",
        request.messages.len(),
        state.config.provider.as_str()
    );

    match llm.generate(&request).await {
        Ok(reply) => Ok(Json(reply)),
        Err(LlmError::Upstream { status, detail }) => {
            tracing::error!(
                "{} API error: {} {}",
                state.config.provider.as_str(),
                status,
                detail
            );
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody::with_detail("LLM provider error", detail)),
            ))
        }
        Err(LlmError::InvalidReply(detail)) => {
            tracing::error!(
                "Unusable {} reply: {}",
                state.config.provider.as_str(),
                detail
            );
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody::with_detail("LLM provider error", detail)),
            ))
        }
        Err(LlmError::Transport(e)) => {
            tracing::error!(
                "Failed to reach {}: {}",
                state.config.provider.as_str(),
                e
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::with_detail(
                    "Failed to reach LLM provider",
                    e.to_string(),
                )),
            ))
        }
    }
}

/// Any non-POST method on the chat path; the body is never parsed
async fn method_not_allowed() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody::new("Method not allowed")),
    )
}

pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/v1/chat", post(send_chat).fallback(method_not_allowed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm::client::{GEMINI_API_URL, OPENROUTER_API_URL};
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(config: Config) -> Router {
        chat_routes().with_state(AppState {
            config: Arc::new(config),
        })
    }

    fn gemini_config(base_url: &str) -> Config {
        Config {
            port: 8080,
            provider: LlmProvider::Gemini,
            gemini_api_key: Some("test-key".to_string()),
            openrouter_api_key: None,
            gemini_api_url: base_url.to_string(),
            openrouter_api_url: OPENROUTER_API_URL.to_string(),
        }
    }

    fn openrouter_config(base_url: &str) -> Config {
        Config {
            port: 8080,
            provider: LlmProvider::OpenRouter,
            gemini_api_key: None,
            openrouter_api_key: Some("test-key".to_string()),
            gemini_api_url: GEMINI_API_URL.to_string(),
            openrouter_api_url: base_url.to_string(),
        }
    }

    fn widget_request() -> Value {
        json!({
            "messages": [{"role": "user", "parts": [{"text": "hi"}]}],
            "systemInstruction": {"parts": [{"text": "Be brief."}]}
        })
    }

    async fn send(app: Router, method: Method, body: Body) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri("/v1/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn non_post_is_rejected_without_a_provider_call() {
        let server = MockServer::start();
        let mock = server.mock(|_when, then| {
            // No matcher restrictions: counts every request that reaches the server
            then.status(200);
        });

        let app = app(gemini_config(&server.base_url()));
        let (status, body) = send(app, Method::GET, Body::empty()).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");
        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_without_a_provider_call() {
        let server = MockServer::start();
        let mock = server.mock(|_when, then| {
            then.status(200);
        });

        let app = app(gemini_config(&server.base_url()));
        let (status, body) = send(app, Method::POST, Body::from("{not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn empty_parts_are_rejected_without_a_provider_call() {
        let server = MockServer::start();
        let mock = server.mock(|_when, then| {
            then.status(200);
        });

        let request = json!({
            "messages": [{"role": "user", "parts": []}],
            "systemInstruction": {"parts": [{"text": "Be brief."}]}
        });

        let app = app(gemini_config(&server.base_url()));
        let (status, body) = send(app, Method::POST, Body::from(request.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn missing_api_key_is_a_server_error_without_a_provider_call() {
        let server = MockServer::start();
        let mock = server.mock(|_when, then| {
            then.status(200);
        });

        let mut config = gemini_config(&server.base_url());
        config.gemini_api_key = None;

        let app = app(config);
        let (status, body) = send(app, Method::POST, Body::from(widget_request().to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "API key not configured");
        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn gemini_reply_reaches_the_widget_unchanged() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.0-flash:generateContent")
                .query_param("key", "test-key");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "candidates": [{"content": {"parts": [{"text": "Hello!"}]}}]
                }));
        });

        let app = app(gemini_config(&server.base_url()));
        let (status, body) = send(app, Method::POST, Body::from(widget_request().to_string())).await;

        mock.assert();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"candidates": [{"content": {"parts": [{"text": "Hello!"}]}}]})
        );
    }

    #[tokio::test]
    async fn openrouter_reply_reaches_the_widget_in_the_same_envelope() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/chat/completions")
                .header("authorization", "Bearer test-key");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "Hello!"}}]
                }));
        });

        let app = app(openrouter_config(&server.base_url()));
        let (status, body) = send(app, Method::POST, Body::from(widget_request().to_string())).await;

        mock.assert();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"candidates": [{"content": {"parts": [{"text": "Hello!"}]}}]})
        );
    }

    #[tokio::test]
    async fn upstream_error_maps_to_bad_gateway_with_detail() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.0-flash:generateContent");
            then.status(500).body("backend blew up");
        });

        let app = app(gemini_config(&server.base_url()));
        let (status, body) = send(app, Method::POST, Body::from(widget_request().to_string())).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "LLM provider error");
        assert_eq!(body["detail"], "backend blew up");
    }

    #[tokio::test]
    async fn unreachable_provider_maps_to_internal_error() {
        // Nothing listens on the discard port
        let app = app(gemini_config("http://127.0.0.1:9"));
        let (status, body) = send(app, Method::POST, Body::from(widget_request().to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to reach LLM provider");
        assert!(body["detail"].is_string());
    }
}
