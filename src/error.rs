//! Error types for the realtime session core

use thiserror::Error;

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors surfaced by a connection session
///
/// Setup failures are returned out of `connect()` for the host to present;
/// anything after the session is established is delivered through the
/// `on_error` callback instead.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Microphone permission denied or no capture device available
    #[error("media access error: {0}")]
    MediaAccess(String),

    /// Token fetch or offer/answer exchange failure
    #[error("negotiation error: {0}")]
    Negotiation(String),

    /// Event channel transport or payload parse failure
    #[error("channel error: {0}")]
    Channel(String),

    /// Error event reported by the realtime service itself
    #[error("server error: {0}")]
    ServerReported(String),
}
