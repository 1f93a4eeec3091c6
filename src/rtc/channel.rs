use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Transport state of the event channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

/// Signals surfaced by the event channel transport
#[derive(Debug, Clone)]
pub enum ChannelSignal {
    /// The channel finished opening and can carry events
    Opened,
    /// An inbound text payload
    Message(String),
    /// A transport-level error; the channel may still recover
    TransportError(String),
    /// The channel closed and will produce no further signals
    Closed,
}

/// Ordered, message-oriented side channel running alongside the media path
#[async_trait]
pub trait EventChannel: Send + Sync {
    fn label(&self) -> &str;

    fn state(&self) -> ChannelState;

    /// Transmit a serialized event; fails if the transport rejects it
    async fn send(&self, payload: &str) -> Result<()>;

    /// Claim the inbound signal stream
    ///
    /// Returns `None` after the first call; there is exactly one consumer.
    fn take_signals(&self) -> Option<mpsc::Receiver<ChannelSignal>>;

    /// Close the channel; safe to call more than once
    fn close(&self);
}
