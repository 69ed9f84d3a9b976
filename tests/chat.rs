//! Integration tests for POST /api/chat (plus /health and /api/models).
//!
//! Verifies that:
//! - A valid request returns the provider's text with timestamp and messageId
//! - Empty/missing/non-string fields get descriptive 400s
//! - A provider reply with no content yields the placeholder, not an error
//! - Provider failures surface as an opaque 500

use std::sync::Arc;

use axum::body::Body;
use http::Request;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use modelmux::api::{create_router, AppState};
use modelmux::catalog::Catalog;
use modelmux::selector::Selector;
use modelmux::upstream::UpstreamClient;

/// Build a modelmux test app pointed at the given upstream base URL.
fn test_app(upstream_url: &str) -> axum::Router {
    let state = AppState {
        client: Arc::new(UpstreamClient::with_client(
            reqwest::Client::new(),
            upstream_url,
            None,
        )),
        selector: Arc::new(Selector::new(
            "openai/gpt-oss-20b:free".to_string(),
            "openai/gpt-3.5-turbo".to_string(),
        )),
        catalog: Arc::new(Catalog::default()),
    };
    create_router(state)
}

fn chat_request(body: serde_json::Value) -> Request<Body> {
    Request::post("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Parse the response body as JSON and return (status_code, json_value).
async fn parse_body(response: axum::response::Response) -> (http::StatusCode, serde_json::Value) {
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
        .await
        .expect("read body");
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap_or_default();
    (status, json)
}

#[tokio::test]
async fn valid_chat_returns_provider_text() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "openai/gpt-4",
            "messages": [{"role": "user", "content": "hi"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-abc",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hello!"},
                    "finish_reason": "stop"
                }
            ],
            "usage": {"prompt_tokens": 1, "completion_tokens": 2, "total_tokens": 3}
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = test_app(&upstream.uri());
    let body = serde_json::json!({"message": "hi", "selectedModel": "openai/gpt-4"});
    let response = app.oneshot(chat_request(body)).await.unwrap();
    let (status, json) = parse_body(response).await;

    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(json["response"], "Hello!");
    let timestamp = json["timestamp"].as_str().expect("timestamp present");
    chrono::DateTime::parse_from_rfc3339(timestamp).expect("RFC 3339 timestamp");
    let message_id = json["messageId"].as_str().expect("messageId present");
    assert!(message_id.starts_with("msg_"));
}

#[tokio::test]
async fn empty_message_rejected() {
    let app = test_app("http://127.0.0.1:1");
    let body = serde_json::json!({"message": "", "selectedModel": "openai/gpt-4"});
    let response = app.oneshot(chat_request(body)).await.unwrap();
    let (status, json) = parse_body(response).await;

    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Message is required and must be a string");
}

#[tokio::test]
async fn non_string_selected_model_rejected() {
    let app = test_app("http://127.0.0.1:1");
    let body = serde_json::json!({"message": "hi", "selectedModel": 123});
    let response = app.oneshot(chat_request(body)).await.unwrap();
    let (status, json) = parse_body(response).await;

    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "SelectedModel is required and must be a string");
}

#[tokio::test]
async fn missing_selected_model_rejected() {
    let app = test_app("http://127.0.0.1:1");
    let body = serde_json::json!({"message": "hi"});
    let response = app.oneshot(chat_request(body)).await.unwrap();
    let (status, json) = parse_body(response).await;

    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "SelectedModel is required and must be a string");
}

#[tokio::test]
async fn empty_generation_yields_placeholder() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-empty",
            "choices": []
        })))
        .mount(&upstream)
        .await;

    let app = test_app(&upstream.uri());
    let body = serde_json::json!({"message": "hi", "selectedModel": "openai/gpt-4"});
    let response = app.oneshot(chat_request(body)).await.unwrap();
    let (status, json) = parse_body(response).await;

    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(json["response"], "No response generated");
}

#[tokio::test]
async fn null_content_yields_placeholder() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-null",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": null}, "finish_reason": "stop"}
            ]
        })))
        .mount(&upstream)
        .await;

    let app = test_app(&upstream.uri());
    let body = serde_json::json!({"message": "hi", "selectedModel": "openai/gpt-4"});
    let response = app.oneshot(chat_request(body)).await.unwrap();
    let (status, json) = parse_body(response).await;

    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(json["response"], "No response generated");
}

#[tokio::test]
async fn provider_error_is_opaque_500() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"message": "model 'made/up-model' not found"}
            })),
        )
        .mount(&upstream)
        .await;

    let app = test_app(&upstream.uri());
    let body = serde_json::json!({"message": "hi", "selectedModel": "made/up-model"});
    let response = app.oneshot(chat_request(body)).await.unwrap();
    let (status, json) = parse_body(response).await;

    assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
    // The specific cause is logged, never exposed to the client.
    assert_eq!(json["error"], "Internal Server Error");
}

#[tokio::test]
async fn unreachable_provider_is_opaque_500() {
    let app = test_app("http://127.0.0.1:1");
    let body = serde_json::json!({"message": "hi", "selectedModel": "openai/gpt-4"});
    let response = app.oneshot(chat_request(body)).await.unwrap();
    let (status, json) = parse_body(response).await;

    assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Internal Server Error");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app("http://127.0.0.1:1");
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let (status, json) = parse_body(response).await;

    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "modelmux");
}

#[tokio::test]
async fn models_lists_catalog() {
    let app = test_app("http://127.0.0.1:1");
    let request = Request::get("/api/models").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let (status, json) = parse_body(response).await;

    assert_eq!(status, http::StatusCode::OK);
    let models = json["models"].as_array().unwrap();
    assert_eq!(models.len(), 11);
    assert_eq!(models[0]["name"], "openai/gpt-4o");
    assert!(models[0]["description"].as_str().unwrap().contains("Context"));
}
