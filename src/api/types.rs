//! API response types.

use serde::{Deserialize, Serialize};

/// Response body for POST /api/select-model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectModelResponse {
    pub model: String,
    pub reason: String,
    /// RFC 3339 timestamp of when the selection completed.
    pub timestamp: String,
}

/// Response body for POST /api/chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    /// RFC 3339 timestamp of when the completion finished.
    pub timestamp: String,
    #[serde(rename = "messageId")]
    pub message_id: String,
}
