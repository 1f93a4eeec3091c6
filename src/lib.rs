pub mod config;
pub mod error;
pub mod rtc;
pub mod session;
pub mod viz;

pub use config::Config;
pub use error::{SessionError, SessionResult};
pub use rtc::{
    AudioPlayback, ChannelSignal, ChannelState, DescriptionKind, EventChannel, MediaCapture,
    MediaStream, PeerConnection, PeerConnectionState, RtcBackend, SessionDescription,
};
pub use session::{
    ClientEvent, ConnectionSession, DescriptionExchange, HttpExchange, Lifecycle, ServerEvent,
    SessionConfig, SessionHandler, SessionStats, Speaker, StatusCategory, TokenClient,
};
pub use viz::{
    AnalyzerConfig, AudioGraph, DrawSurface, FrequencyAnalyzer, Lane, LevelVisualizer, Rect, Rgba,
    VisualizerConfig,
};
