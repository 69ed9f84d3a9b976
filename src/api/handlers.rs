//! HTTP request handlers.
//!
//! Both POST endpoints take the raw JSON body and validate field presence
//! and type by hand, so a missing or wrong-typed field produces a
//! descriptive 400 rather than a framework deserialization error.

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use uuid::Uuid;

use super::server::AppState;
use super::types::{ChatResponse, SelectModelResponse};
use crate::error::{Error, Result};
use crate::invoker;
use crate::selector::PromptProperties;

/// Pull a required non-empty string field out of the request body.
fn require_string<'a>(
    body: &'a serde_json::Value,
    field: &str,
    message: &str,
) -> Result<&'a str> {
    body.get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::BadRequest(message.to_string()))
}

/// First 100 chars of a message, for log fields.
fn preview(message: &str) -> String {
    let truncated: String = message.chars().take(100).collect();
    if truncated.len() < message.len() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

/// Coarse latency classification for selection calls.
fn latency_bucket(ms: u64) -> &'static str {
    if ms > 5000 {
        "HIGH"
    } else if ms > 2000 {
        "MEDIUM"
    } else {
        "LOW"
    }
}

/// Handle POST /api/select-model
pub async fn select_model(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<SelectModelResponse>> {
    let start = std::time::Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let message = require_string(
        &body,
        "message",
        "Message is required and must be a string",
    )
    .inspect_err(|_| {
        tracing::warn!(request_id = %request_id, "Invalid message format");
    })?;

    let props_value = body
        .get("promptProps")
        .cloned()
        .ok_or_else(|| Error::BadRequest("PromptProps is required".to_string()))
        .inspect_err(|_| {
            tracing::warn!(request_id = %request_id, "Missing promptProps");
        })?;

    let preferences: PromptProperties = serde_json::from_value(props_value).map_err(|e| {
        tracing::warn!(request_id = %request_id, error = %e, "Malformed promptProps");
        Error::BadRequest(format!("PromptProps is malformed: {}", e))
    })?;

    tracing::info!(
        request_id = %request_id,
        message_length = message.len(),
        message_preview = %preview(message),
        accuracy = preferences.accuracy,
        cost = preferences.cost,
        speed = preferences.speed,
        token_limit = preferences.token_limit,
        reasoning = preferences.reasoning,
        available_models = state.catalog.len(),
        "Processing model selection request"
    );

    let selection_start = std::time::Instant::now();
    let selection = state
        .selector
        .select_best_model(&state.client, &state.catalog, message, &preferences)
        .await;
    let selection_ms = selection_start.elapsed().as_millis() as u64;

    tracing::info!(
        request_id = %request_id,
        selected_model = %selection.model,
        selection_duration_ms = selection_ms,
        total_duration_ms = start.elapsed().as_millis() as u64,
        selection_latency = latency_bucket(selection_ms),
        "Model selected"
    );

    Ok(Json(SelectModelResponse {
        model: selection.model,
        reason: selection.reason,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// Handle POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ChatResponse>> {
    let start = std::time::Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let message = require_string(
        &body,
        "message",
        "Message is required and must be a string",
    )
    .inspect_err(|_| {
        tracing::warn!(request_id = %request_id, "Invalid message format");
    })?;

    let selected_model = require_string(
        &body,
        "selectedModel",
        "SelectedModel is required and must be a string",
    )
    .inspect_err(|_| {
        tracing::warn!(request_id = %request_id, "Invalid selectedModel format");
    })?;

    tracing::info!(
        request_id = %request_id,
        model = %selected_model,
        message_length = message.len(),
        message_preview = %preview(message),
        "Processing chat request"
    );

    let response_text = invoker::complete(&state.client, message, selected_model)
        .await
        .inspect_err(|e| {
            tracing::error!(
                request_id = %request_id,
                model = %selected_model,
                error = %e,
                total_duration_ms = start.elapsed().as_millis() as u64,
                "Chat completion failed"
            );
        })?;

    tracing::info!(
        request_id = %request_id,
        model = %selected_model,
        response_length = response_text.len(),
        total_duration_ms = start.elapsed().as_millis() as u64,
        "Chat completion finished"
    );

    Ok(Json(ChatResponse {
        response: response_text,
        timestamp: Utc::now().to_rfc3339(),
        message_id: format!("msg_{}", Uuid::new_v4()),
    }))
}

/// Handle GET /api/models - list the model catalog
pub async fn list_models(State(state): State<AppState>) -> impl IntoResponse {
    let models: Vec<serde_json::Value> = state
        .catalog
        .models()
        .iter()
        .map(|m| {
            serde_json::json!({
                "name": m.name,
                "description": m.description,
            })
        })
        .collect();

    Json(serde_json::json!({ "models": models }))
}

/// Handle GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "modelmux"
    }))
}
