use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::config::SessionConfig;
use super::events::{ClientEvent, ServerEvent};
use super::exchange::DescriptionExchange;
use super::handler::{SessionHandler, Speaker, StatusCategory};
use super::stats::{Lifecycle, SessionStats};
use crate::error::SessionError;
use crate::rtc::{
    AudioPlayback, ChannelSignal, ChannelState, EventChannel, MediaCapture, MediaStream,
    PeerConnection, PeerConnectionState, RtcBackend, SessionDescription,
};

/// A realtime interview session
///
/// Owns the peer connection, the microphone capture stream, the remote
/// playback sink, and the event channel; relays inbound server events to
/// the host through its [`SessionHandler`]. One instance backs at most one
/// connection at a time and is torn down with [`disconnect`].
///
/// [`disconnect`]: ConnectionSession::disconnect
pub struct ConnectionSession {
    config: SessionConfig,

    rtc: Arc<dyn RtcBackend>,
    capture: Arc<dyn MediaCapture>,
    exchange: Arc<dyn DescriptionExchange>,
    playback: Arc<dyn AudioPlayback>,
    handler: Arc<dyn SessionHandler>,

    lifecycle: Mutex<Lifecycle>,
    started_at: DateTime<Utc>,

    peer: Mutex<Option<Arc<dyn PeerConnection>>>,
    channel: Mutex<Option<Arc<dyn EventChannel>>>,
    local_stream: Mutex<Option<MediaStream>>,

    /// Handle for the inbound event dispatch task
    dispatch_task: Mutex<Option<JoinHandle<()>>>,

    /// Handle for the remote track watcher task
    track_task: Mutex<Option<JoinHandle<()>>>,

    events_received: Arc<AtomicUsize>,
    messages_emitted: Arc<AtomicUsize>,
    errors_reported: Arc<AtomicUsize>,
}

impl ConnectionSession {
    pub fn new(
        config: SessionConfig,
        rtc: Arc<dyn RtcBackend>,
        capture: Arc<dyn MediaCapture>,
        exchange: Arc<dyn DescriptionExchange>,
        playback: Arc<dyn AudioPlayback>,
        handler: Arc<dyn SessionHandler>,
    ) -> Self {
        Self {
            config,
            rtc,
            capture,
            exchange,
            playback,
            handler,
            lifecycle: Mutex::new(Lifecycle::Idle),
            started_at: Utc::now(),
            peer: Mutex::new(None),
            channel: Mutex::new(None),
            local_stream: Mutex::new(None),
            dispatch_task: Mutex::new(None),
            track_task: Mutex::new(None),
            events_received: Arc::new(AtomicUsize::new(0)),
            messages_emitted: Arc::new(AtomicUsize::new(0)),
            errors_reported: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Establish the session: capture, offer/answer exchange, channel setup
    ///
    /// Rejects overlapping calls: only an idle session may connect. A
    /// failure at any step releases everything the attempt allocated and
    /// returns the session to idle so the host can retry.
    pub async fn connect(&self, access_token: &str) -> Result<(), SessionError> {
        {
            let mut lifecycle = self.lifecycle.lock();
            if *lifecycle != Lifecycle::Idle {
                return Err(SessionError::Negotiation(format!(
                    "connect rejected: session is {:?}",
                    *lifecycle
                )));
            }
            *lifecycle = Lifecycle::Connecting;
        }

        self.handler
            .on_status_change("Connecting...", StatusCategory::Connecting);

        if let Err(err) = self.establish(access_token).await {
            warn!("Connect failed for {}: {}", self.config.session_id, err);
            self.release_resources();
            {
                // A disconnect racing the failure keeps the session closed
                let mut lifecycle = self.lifecycle.lock();
                if *lifecycle == Lifecycle::Connecting {
                    *lifecycle = Lifecycle::Idle;
                }
            }
            self.handler.on_status_change("Error", StatusCategory::Error);
            return Err(err);
        }

        Ok(())
    }

    async fn establish(&self, access_token: &str) -> Result<(), SessionError> {
        info!("Starting realtime session: {}", self.config.session_id);

        let peer: Arc<dyn PeerConnection> = Arc::from(
            self.rtc
                .create_peer_connection()
                .await
                .map_err(|e| {
                    SessionError::Negotiation(format!("failed to create peer connection: {e}"))
                })?,
        );
        if !self.is_live() {
            peer.close();
            return Ok(());
        }
        *self.peer.lock() = Some(Arc::clone(&peer));

        self.spawn_track_watcher(&peer);

        // Microphone capture feeds the outbound track
        let local = self
            .capture
            .open_microphone()
            .await
            .map_err(|e| SessionError::MediaAccess(format!("failed to access microphone: {e}")))?;
        if !self.is_live() {
            self.capture.stop_stream(&local);
            return Ok(());
        }
        *self.local_stream.lock() = Some(local.clone());
        peer.add_audio_track(&local)
            .await
            .map_err(|e| SessionError::MediaAccess(format!("failed to attach microphone: {e}")))?;
        self.handler.on_local_stream(&local);

        // Event channel for transcript/control traffic
        let channel: Arc<dyn EventChannel> = Arc::from(
            peer.create_event_channel(&self.config.channel_label)
                .await
                .map_err(|e| {
                    SessionError::Channel(format!("failed to create event channel: {e}"))
                })?,
        );
        if !self.is_live() {
            channel.close();
            return Ok(());
        }
        *self.channel.lock() = Some(Arc::clone(&channel));
        self.spawn_dispatch(&channel);

        // Offer/answer negotiation with the realtime service
        let offer = peer
            .create_offer()
            .await
            .map_err(|e| SessionError::Negotiation(format!("failed to create offer: {e}")))?;
        peer.set_local_description(offer.clone())
            .await
            .map_err(|e| {
                SessionError::Negotiation(format!("failed to apply local description: {e}"))
            })?;

        let answer_sdp = self.exchange.exchange(&offer.sdp, access_token).await?;

        // A disconnect may have raced the exchange; drop the late answer
        if !self.is_live() {
            debug!("Session closed during negotiation; discarding answer");
            return Ok(());
        }
        peer.set_remote_description(SessionDescription::answer(answer_sdp))
            .await
            .map_err(|e| {
                SessionError::Negotiation(format!("failed to apply remote description: {e}"))
            })?;

        *self.lifecycle.lock() = Lifecycle::Connected;
        self.handler
            .on_status_change("Connected", StatusCategory::Connected);
        info!("Realtime session established: {}", self.config.session_id);

        Ok(())
    }

    /// Serialize and transmit an application-level event
    ///
    /// Logged no-op when the channel is missing or not open; UI actions
    /// must never be able to crash the host through this path.
    pub async fn send_event(&self, event: &ClientEvent) {
        let channel = self.channel.lock().clone();
        let Some(channel) = channel else {
            warn!("Cannot send event: no event channel");
            return;
        };
        if channel.state() != ChannelState::Open {
            warn!("Cannot send event: channel not open");
            return;
        }

        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize outbound event: {}", e);
                return;
            }
        };

        match channel.send(&payload).await {
            Ok(()) => debug!("Sent event: {}", payload),
            Err(e) => warn!("Failed to send event: {}", e),
        }
    }

    /// Send a user-authored text turn followed by a response trigger
    pub async fn send_text_message(&self, text: &str) {
        self.send_event(&ClientEvent::user_text(text)).await;
        self.send_event(&ClientEvent::ResponseCreate).await;
    }

    /// Idempotent teardown
    ///
    /// Stops outbound tracks, closes the channel and peer connection,
    /// releases the playback sink, and cancels the dispatch tasks. Safe on
    /// a session that never connected or was already disconnected.
    pub fn disconnect(&self) {
        let had_connection = {
            let mut lifecycle = self.lifecycle.lock();
            let prior = *lifecycle;
            *lifecycle = Lifecycle::Closed;
            matches!(prior, Lifecycle::Connecting | Lifecycle::Connected)
        };

        self.release_resources();

        if had_connection {
            info!("Disconnected session: {}", self.config.session_id);
            self.handler
                .on_status_change("Disconnected", StatusCategory::Disconnected);
        }
    }

    /// True only while the peer connection reports a fully connected state
    pub fn is_connected(&self) -> bool {
        self.peer
            .lock()
            .as_ref()
            .map(|peer| peer.state() == PeerConnectionState::Connected)
            .unwrap_or(false)
    }

    /// Snapshot of the session's activity counters
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            lifecycle: *self.lifecycle.lock(),
            started_at: self.started_at,
            events_received: self.events_received.load(Ordering::SeqCst),
            messages_emitted: self.messages_emitted.load(Ordering::SeqCst),
            errors_reported: self.errors_reported.load(Ordering::SeqCst),
        }
    }

    fn is_live(&self) -> bool {
        *self.lifecycle.lock() == Lifecycle::Connecting
    }

    fn release_resources(&self) {
        if let Some(task) = self.dispatch_task.lock().take() {
            task.abort();
        }
        if let Some(task) = self.track_task.lock().take() {
            task.abort();
        }
        if let Some(stream) = self.local_stream.lock().take() {
            self.capture.stop_stream(&stream);
        }
        if let Some(channel) = self.channel.lock().take() {
            channel.close();
        }
        if let Some(peer) = self.peer.lock().take() {
            peer.close();
        }
        self.playback.release();
    }

    /// Forward remote tracks to the playback sink and the host
    fn spawn_track_watcher(&self, peer: &Arc<dyn PeerConnection>) {
        let Some(mut remote_rx) = peer.take_remote_streams() else {
            warn!("Remote stream receiver already claimed");
            return;
        };
        let playback = Arc::clone(&self.playback);
        let handler = Arc::clone(&self.handler);

        let task = tokio::spawn(async move {
            while let Some(stream) = remote_rx.recv().await {
                debug!("Remote stream attached: {}", stream.id);
                playback.attach(&stream);
                handler.on_remote_stream(&stream);
            }
        });
        *self.track_task.lock() = Some(task);
    }

    /// Consume channel signals and dispatch server events to the host
    fn spawn_dispatch(&self, channel: &Arc<dyn EventChannel>) {
        let Some(mut signals) = channel.take_signals() else {
            warn!("Event channel signals already claimed");
            return;
        };
        let handler = Arc::clone(&self.handler);
        let events_received = Arc::clone(&self.events_received);
        let messages_emitted = Arc::clone(&self.messages_emitted);
        let errors_reported = Arc::clone(&self.errors_reported);

        let task = tokio::spawn(async move {
            debug!("Event dispatch task started");

            while let Some(signal) = signals.recv().await {
                match signal {
                    ChannelSignal::Opened => {
                        debug!("Event channel open");
                    }
                    ChannelSignal::Message(raw) => {
                        events_received.fetch_add(1, Ordering::SeqCst);
                        match ServerEvent::parse(&raw) {
                            Ok(event) => dispatch_event(
                                event,
                                handler.as_ref(),
                                &messages_emitted,
                                &errors_reported,
                            ),
                            Err(e) => {
                                warn!("Dropping unparseable channel payload: {}", e);
                                errors_reported.fetch_add(1, Ordering::SeqCst);
                                handler.on_error(
                                    &SessionError::Channel(format!("invalid event payload: {e}"))
                                        .to_string(),
                                );
                            }
                        }
                    }
                    ChannelSignal::TransportError(message) => {
                        errors_reported.fetch_add(1, Ordering::SeqCst);
                        handler.on_error(&SessionError::Channel(message).to_string());
                    }
                    ChannelSignal::Closed => break,
                }
            }

            debug!("Event dispatch task stopped");
        });
        *self.dispatch_task.lock() = Some(task);
    }
}

/// Route one parsed server event to the host callbacks
///
/// Every arm tolerates missing payload fields by doing nothing; an event
/// the service grows tomorrow must never take the dispatch loop down.
fn dispatch_event(
    event: ServerEvent,
    handler: &dyn SessionHandler,
    messages_emitted: &AtomicUsize,
    errors_reported: &AtomicUsize,
) {
    let emit = |speaker: Speaker, text: &str| {
        messages_emitted.fetch_add(1, Ordering::SeqCst);
        handler.on_message(speaker, text);
    };

    match event {
        ServerEvent::SessionCreated => {
            emit(Speaker::System, "Session created successfully");
        }
        ServerEvent::SessionUpdated => {
            emit(Speaker::System, "Session configuration updated");
        }
        ServerEvent::ConversationItemCreated { item } => {
            let Some(item) = item else { return };
            match (item.role.as_deref(), item.transcript()) {
                (Some("user"), Some(transcript)) => emit(Speaker::Interviewer, transcript),
                (Some("assistant"), Some(transcript)) => emit(Speaker::Assistant, transcript),
                _ => {}
            }
        }
        ServerEvent::InputTranscriptionCompleted { transcript } => {
            if let Some(transcript) = transcript {
                emit(Speaker::Interviewer, &transcript);
            }
        }
        ServerEvent::AudioTranscriptDelta { delta } => {
            // Incremental text is not surfaced to the transcript
            if let Some(delta) = delta {
                debug!("Transcript delta: {}", delta);
            }
        }
        ServerEvent::AudioTranscriptDone { transcript } => {
            if let Some(transcript) = transcript {
                emit(Speaker::Assistant, &transcript);
            }
        }
        ServerEvent::SpeechStarted => {
            debug!("Interviewer started speaking");
        }
        ServerEvent::SpeechStopped => {
            debug!("Interviewer stopped speaking");
        }
        ServerEvent::ServerError { error } => {
            let message = error
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            errors_reported.fetch_add(1, Ordering::SeqCst);
            handler.on_error(&SessionError::ServerReported(message).to_string());
        }
        ServerEvent::Unknown { raw_type } => {
            debug!("Unhandled event: {}", raw_type);
        }
    }
}
