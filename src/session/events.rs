use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound event from the realtime service, tagged by its `type` field
///
/// Every payload field is optional so a partial or reshaped payload
/// degrades to a no-op during dispatch instead of a parse failure. Tags
/// this client does not handle land in `Unknown` with the raw tag kept
/// for diagnostics.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "session.created")]
    SessionCreated,

    #[serde(rename = "session.updated")]
    SessionUpdated,

    #[serde(rename = "conversation.item.created")]
    ConversationItemCreated {
        #[serde(default)]
        item: Option<ConversationItem>,
    },

    #[serde(rename = "conversation.item.input_audio_transcription.completed")]
    InputTranscriptionCompleted {
        #[serde(default)]
        transcript: Option<String>,
    },

    #[serde(rename = "response.audio_transcript.delta")]
    AudioTranscriptDelta {
        #[serde(default)]
        delta: Option<String>,
    },

    #[serde(rename = "response.audio_transcript.done")]
    AudioTranscriptDone {
        #[serde(default)]
        transcript: Option<String>,
    },

    #[serde(rename = "input_audio_buffer.speech_started")]
    SpeechStarted,

    #[serde(rename = "input_audio_buffer.speech_stopped")]
    SpeechStopped,

    #[serde(rename = "error")]
    ServerError {
        #[serde(default)]
        error: Option<ErrorDetail>,
    },

    /// Any tag this client does not handle
    #[serde(skip)]
    Unknown { raw_type: String },
}

impl ServerEvent {
    /// Parse a raw channel payload
    ///
    /// Non-JSON input is an error for the caller to report. Valid JSON
    /// with an unhandled tag or a malformed payload shape degrades to
    /// `Unknown` so the dispatch loop never crashes on a new event kind.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        let raw_type = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(serde_json::from_value(value).unwrap_or(ServerEvent::Unknown { raw_type }))
    }
}

/// A conversation item carried by `conversation.item.created`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationItem {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub formatted: Option<FormattedItem>,
}

impl ConversationItem {
    /// Transcript text, when the service has formatted one
    pub fn transcript(&self) -> Option<&str> {
        self.formatted.as_ref()?.transcript.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormattedItem {
    #[serde(default)]
    pub transcript: Option<String>,
}

/// Payload of a server-reported `error` event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}

/// Outbound event envelope, tagged the same way as inbound events
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate { item: OutboundItem },

    #[serde(rename = "response.create")]
    ResponseCreate,
}

impl ClientEvent {
    /// Build a user-authored text turn
    pub fn user_text(text: impl Into<String>) -> Self {
        ClientEvent::ConversationItemCreate {
            item: OutboundItem {
                kind: "message".to_string(),
                role: "user".to_string(),
                content: vec![ContentPart {
                    kind: "input_text".to_string(),
                    text: text.into(),
                }],
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutboundItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub role: String,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}
