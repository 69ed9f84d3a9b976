//! Model selection via a meta-model.
//!
//! The selector asks a fixed meta-model to pick the best backend for a
//! prompt, given the catalog and the user's preference weights. Any failure
//! along the way degrades to a fixed fallback model; callers always get a
//! `ModelSelection`, never an error.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::catalog::Catalog;
use crate::upstream::{ChatMessage, UpstreamClient};

/// User preference weights, serialized verbatim into the meta-model prompt.
///
/// Values are untrusted hints; nothing range-checks them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptProperties {
    pub accuracy: f64,
    pub cost: f64,
    pub speed: f64,
    pub token_limit: u32,
    pub reasoning: bool,
}

/// Result of model selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSelection {
    /// Model identifier, usually (but not verifiably) from the catalog.
    pub model: String,
    /// Free-text justification from the meta-model or the fallback path.
    pub reason: String,
}

/// Why a selection attempt failed before falling back.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("{0}")]
    Upstream(#[from] crate::error::Error),

    #[error("No content received from selector model")]
    EmptyResponse,

    #[error("Selector response is not valid JSON: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("Selector response missing string field '{0}'")]
    MissingField(&'static str),
}

/// Picks a backend model per prompt by querying the meta-model.
#[derive(Debug, Clone)]
pub struct Selector {
    selector_model: String,
    fallback_model: String,
}

impl Selector {
    pub fn new(selector_model: String, fallback_model: String) -> Self {
        Self {
            selector_model,
            fallback_model,
        }
    }

    /// Select the best model for a prompt.
    ///
    /// Infallible by contract: any upstream or decode failure yields a
    /// fallback selection whose reason embeds the error detail.
    pub async fn select_best_model(
        &self,
        client: &UpstreamClient,
        catalog: &Catalog,
        prompt: &str,
        preferences: &PromptProperties,
    ) -> ModelSelection {
        match self.try_select(client, catalog, prompt, preferences).await {
            Ok(selection) => {
                tracing::info!(
                    model = %selection.model,
                    reason = %selection.reason,
                    "Meta-model selected model"
                );
                selection
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback_model = %self.fallback_model,
                    "Model selection failed, using fallback"
                );
                ModelSelection {
                    model: self.fallback_model.clone(),
                    reason: format!("Fallback due to model selection error: {}", e),
                }
            }
        }
    }

    async fn try_select(
        &self,
        client: &UpstreamClient,
        catalog: &Catalog,
        prompt: &str,
        preferences: &PromptProperties,
    ) -> Result<ModelSelection, SelectionError> {
        let messages = [
            ChatMessage::system(build_system_prompt(catalog)),
            ChatMessage::user(build_user_turn(prompt, preferences)?),
        ];

        let response = client.chat(&self.selector_model, &messages).await?;

        let content = response
            .first_content()
            .filter(|c| !c.trim().is_empty())
            .ok_or(SelectionError::EmptyResponse)?;

        parse_selection(content)
    }
}

/// Fixed selection instruction: criteria, catalog, and required output shape.
fn build_system_prompt(catalog: &Catalog) -> String {
    format!(
        "You are an expert in selecting the best LLM for a given prompt.\n\
         \n\
         Given the following user prompt, select the best LLM for this prompt based on \
         the following criteria and the preferences of the user:\n\
         \n\
         <criteria>\n\
         Category of prompt,\n\
         Accuracy,\n\
         Cost,\n\
         Speed,\n\
         Token Limit,\n\
         Reasoning Enabled,\n\
         </criteria>\n\
         \n\
         <models_available>\n\
         {}\n\
         </models_available>\n\
         \n\
         <output>\n\
         {{\n\
         \"model\": \"model_name\",\n\
         \"reason\": \"reason\"\n\
         }}\n\
         </output>",
        catalog.render()
    )
}

/// The user turn: raw prompt plus the serialized preference vector.
fn build_user_turn(
    prompt: &str,
    preferences: &PromptProperties,
) -> Result<String, SelectionError> {
    let serialized = serde_json::to_string(preferences)?;
    Ok(format!(
        "<user_prompt>{}</user_prompt> <user_preferences>{}</user_preferences>",
        prompt, serialized
    ))
}

fn code_fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"```json\n?|\n?```").unwrap())
}

/// Decode the meta-model's reply into a `ModelSelection`.
///
/// Strips surrounding code fences, decodes the JSON envelope, then requires
/// non-empty string fields `model` and `reason`.
fn parse_selection(content: &str) -> Result<ModelSelection, SelectionError> {
    let cleaned = code_fence_regex().replace_all(content, "");
    let cleaned = cleaned.trim();

    let envelope: serde_json::Value = serde_json::from_str(cleaned)?;

    let model = envelope
        .get("model")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or(SelectionError::MissingField("model"))?;
    let reason = envelope
        .get("reason")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or(SelectionError::MissingField("reason"))?;

    Ok(ModelSelection {
        model: model.to_string(),
        reason: reason.to_string(),
    })
}
