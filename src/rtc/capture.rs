use anyhow::Result;
use async_trait::async_trait;

/// Opaque handle to a platform media stream
///
/// The core only routes these between the capture backend, the peer
/// connection, the playback sink, and the visualizer; the platform
/// implementation resolves the id back to its own stream object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStream {
    /// Platform-assigned stream identifier
    pub id: String,
}

impl MediaStream {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Microphone capture capability
///
/// Implementations prompt for permission on first use. A denial or a
/// missing device surfaces as an error from `open_microphone` and is
/// mapped to a media-access failure by the session.
#[async_trait]
pub trait MediaCapture: Send + Sync {
    /// Open the default microphone and return its stream handle
    async fn open_microphone(&self) -> Result<MediaStream>;

    /// Stop all tracks of a previously opened stream and release the device
    fn stop_stream(&self, stream: &MediaStream);
}

/// Sink for remote audio playback
///
/// The session attaches the assistant's stream here as soon as the remote
/// track arrives and releases it on teardown.
pub trait AudioPlayback: Send + Sync {
    fn attach(&self, stream: &MediaStream);
    fn release(&self);
}
