use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::capture::MediaStream;
use super::channel::EventChannel;

/// Connection state reported by the underlying peer connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Which side of the offer/answer handshake a description belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionKind {
    Offer,
    Answer,
}

/// A session description exchanged during negotiation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub kind: DescriptionKind,
    /// Raw description text as produced/consumed by the platform
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: DescriptionKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: DescriptionKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// Peer connection capability
///
/// One instance backs one connection attempt; the session closes it on
/// teardown and creates a fresh one on the next connect.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    /// Attach a local outbound audio track
    async fn add_audio_track(&self, stream: &MediaStream) -> Result<()>;

    /// Create the bidirectional event channel with the given label
    async fn create_event_channel(&self, label: &str) -> Result<Box<dyn EventChannel>>;

    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, description: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    /// Claim the stream of remote tracks announced by the platform
    ///
    /// Returns `None` after the first call; there is exactly one consumer.
    fn take_remote_streams(&self) -> Option<mpsc::Receiver<MediaStream>>;

    fn state(&self) -> PeerConnectionState;

    /// Close the connection; safe to call more than once
    fn close(&self);
}

/// Factory seam for creating peer connections
#[async_trait]
pub trait RtcBackend: Send + Sync {
    async fn create_peer_connection(&self) -> Result<Box<dyn PeerConnection>>;
}
