use serde::{Deserialize, Serialize};

/// Configuration for a realtime interview session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "interview-<uuid>")
    pub session_id: String,

    /// Offer/answer exchange endpoint of the realtime service
    pub exchange_url: String,

    /// Model requested from the service
    pub model: String,

    /// Label for the bidirectional event channel
    pub channel_label: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("interview-{}", uuid::Uuid::new_v4()),
            exchange_url: "https://api.openai.com/v1/realtime/calls".to_string(),
            model: "gpt-realtime".to_string(),
            channel_label: "oai-events".to_string(),
        }
    }
}
