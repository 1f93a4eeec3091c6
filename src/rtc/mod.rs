//! Platform capability traits for the realtime media path
//!
//! The session core never talks to a real peer connection, microphone, or
//! data channel directly. Host environments implement these traits over
//! whatever the platform provides; tests implement them with fakes.

pub mod capture;
pub mod channel;
pub mod peer;

pub use capture::{AudioPlayback, MediaCapture, MediaStream};
pub use channel::{ChannelSignal, ChannelState, EventChannel};
pub use peer::{
    DescriptionKind, PeerConnection, PeerConnectionState, RtcBackend, SessionDescription,
};
