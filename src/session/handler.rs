use std::fmt;

use crate::rtc::MediaStream;

/// Who a transcript line is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    System,
    Interviewer,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Speaker::System => "System",
            Speaker::Interviewer => "Interviewer",
            Speaker::Assistant => "Assistant",
        };
        f.write_str(name)
    }
}

/// Status-badge category accompanying a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

/// Host-side callbacks a session delivers events through
///
/// The stream hooks default to no-ops; hosts that do not visualize audio
/// simply leave them unimplemented.
pub trait SessionHandler: Send + Sync {
    fn on_status_change(&self, status: &str, category: StatusCategory);

    fn on_message(&self, speaker: Speaker, text: &str);

    fn on_error(&self, message: &str);

    fn on_local_stream(&self, _stream: &MediaStream) {}

    fn on_remote_stream(&self, _stream: &MediaStream) {}
}
