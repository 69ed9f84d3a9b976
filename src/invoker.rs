//! Completion invocation against the selected model.

use crate::error::Result;
use crate::upstream::{ChatMessage, UpstreamClient};

/// Substituted when the provider produces no text at all.
pub const EMPTY_RESPONSE_PLACEHOLDER: &str = "No response generated";

/// Send the prompt to the named model and return the generated text.
///
/// A response with no choices or empty content is a soft condition and
/// yields the placeholder string. Transport and provider errors propagate
/// unchanged; the request boundary decides how to surface them.
pub async fn complete(client: &UpstreamClient, prompt: &str, model: &str) -> Result<String> {
    let messages = [ChatMessage::user(prompt)];

    let response = client.chat(model, &messages).await?;

    let text = response
        .first_content()
        .filter(|content| !content.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            tracing::warn!(model = %model, "Provider returned no content, using placeholder");
            EMPTY_RESPONSE_PLACEHOLDER.to_string()
        });

    Ok(text)
}
