//! Realtime interview session management
//!
//! This module provides the `ConnectionSession` abstraction that manages:
//! - Microphone capture and outbound track attachment
//! - Offer/answer negotiation with the realtime service
//! - The bidirectional event channel and inbound event dispatch
//! - Host callbacks for transcript, status, and stream availability

mod config;
mod events;
mod exchange;
mod handler;
mod session;
mod stats;
mod token;

pub use config::SessionConfig;
pub use events::{
    ClientEvent, ContentPart, ConversationItem, ErrorDetail, FormattedItem, OutboundItem,
    ServerEvent,
};
pub use exchange::{DescriptionExchange, HttpExchange};
pub use handler::{SessionHandler, Speaker, StatusCategory};
pub use session::ConnectionSession;
pub use stats::{Lifecycle, SessionStats};
pub use token::TokenClient;
