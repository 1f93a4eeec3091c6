use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle flag of a connection session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// Created but never connected, or reset after a failed connect
    Idle,
    /// A connect attempt is in flight
    Connecting,
    /// Negotiation completed and the media path is up
    Connected,
    /// Torn down; the session is not reusable
    Closed,
}

/// Snapshot of a session's activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub lifecycle: Lifecycle,

    /// When the session object was created
    pub started_at: DateTime<Utc>,

    /// Inbound channel payloads seen by the dispatch loop
    pub events_received: usize,

    /// Transcript messages delivered to the host
    pub messages_emitted: usize,

    /// Errors surfaced through the error callback
    pub errors_reported: usize,
}
