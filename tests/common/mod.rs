// Shared fakes standing in for the platform primitives, so the session
// and visualizer can be exercised without hardware or a network.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};

use interview_rtc::{
    AnalyzerConfig, AudioGraph, AudioPlayback, ChannelSignal, ChannelState, ConnectionSession,
    DescriptionExchange, DrawSurface, EventChannel, FrequencyAnalyzer, MediaCapture, MediaStream,
    PeerConnection, PeerConnectionState, Rect, Rgba, RtcBackend, SessionConfig, SessionDescription,
    SessionError, SessionHandler, Speaker, StatusCategory,
};

/// Poll until `condition` holds, panicking after two seconds.
pub async fn wait_for(condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        if tokio::time::Instant::now() > deadline {
            panic!("condition not met within timeout");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

// ============================================================================
// RTC fakes
// ============================================================================

pub struct PeerInner {
    pub state: Mutex<PeerConnectionState>,
    pub closed: AtomicBool,
    pub tracks: Mutex<Vec<MediaStream>>,
    pub local_description: Mutex<Option<SessionDescription>>,
    pub remote_description: Mutex<Option<SessionDescription>>,
}

pub struct ChannelInner {
    pub state: Mutex<ChannelState>,
    pub sent: Mutex<Vec<String>>,
    pub closed: AtomicBool,
    pub fail_send: AtomicBool,
    signal_tx: Mutex<Option<mpsc::Sender<ChannelSignal>>>,
}

impl ChannelInner {
    /// Inject an inbound signal as if it came from the transport.
    pub async fn push(&self, signal: ChannelSignal) {
        let tx = self
            .signal_tx
            .lock()
            .unwrap()
            .clone()
            .expect("no event channel created");
        tx.send(signal).await.expect("dispatch loop gone");
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

pub struct FakeRtcBackend {
    pub peer: Arc<PeerInner>,
    pub channel: Arc<ChannelInner>,
    pub created: AtomicUsize,
    pub fail_create: AtomicBool,
    remote_tx: Mutex<Option<mpsc::Sender<MediaStream>>>,
}

impl FakeRtcBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            peer: Arc::new(PeerInner {
                state: Mutex::new(PeerConnectionState::New),
                closed: AtomicBool::new(false),
                tracks: Mutex::new(Vec::new()),
                local_description: Mutex::new(None),
                remote_description: Mutex::new(None),
            }),
            channel: Arc::new(ChannelInner {
                state: Mutex::new(ChannelState::Open),
                sent: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
                fail_send: AtomicBool::new(false),
                signal_tx: Mutex::new(None),
            }),
            created: AtomicUsize::new(0),
            fail_create: AtomicBool::new(false),
            remote_tx: Mutex::new(None),
        })
    }

    /// Announce a remote track, as the platform would after negotiation.
    pub async fn announce_remote_stream(&self, stream: MediaStream) {
        let tx = self
            .remote_tx
            .lock()
            .unwrap()
            .clone()
            .expect("no peer connection created");
        tx.send(stream).await.expect("track watcher gone");
    }
}

#[async_trait]
impl RtcBackend for FakeRtcBackend {
    async fn create_peer_connection(&self) -> Result<Box<dyn PeerConnection>> {
        if self.fail_create.load(Ordering::SeqCst) {
            anyhow::bail!("rtc backend unavailable");
        }
        let (tx, rx) = mpsc::channel(8);
        *self.remote_tx.lock().unwrap() = Some(tx);
        self.created.fetch_add(1, Ordering::SeqCst);

        // A fresh attempt starts from a clean peer state
        *self.peer.state.lock().unwrap() = PeerConnectionState::New;
        self.peer.closed.store(false, Ordering::SeqCst);

        Ok(Box::new(FakePeerConnection {
            inner: Arc::clone(&self.peer),
            channel: Arc::clone(&self.channel),
            remote_rx: Mutex::new(Some(rx)),
        }))
    }
}

pub struct FakePeerConnection {
    inner: Arc<PeerInner>,
    channel: Arc<ChannelInner>,
    remote_rx: Mutex<Option<mpsc::Receiver<MediaStream>>>,
}

#[async_trait]
impl PeerConnection for FakePeerConnection {
    async fn add_audio_track(&self, stream: &MediaStream) -> Result<()> {
        self.inner.tracks.lock().unwrap().push(stream.clone());
        Ok(())
    }

    async fn create_event_channel(&self, label: &str) -> Result<Box<dyn EventChannel>> {
        let (tx, rx) = mpsc::channel(32);
        // The fake channel opens instantly
        tx.send(ChannelSignal::Opened).await.ok();
        *self.channel.signal_tx.lock().unwrap() = Some(tx);
        *self.channel.state.lock().unwrap() = ChannelState::Open;
        self.channel.closed.store(false, Ordering::SeqCst);

        Ok(Box::new(FakeEventChannel {
            inner: Arc::clone(&self.channel),
            label: label.to_string(),
            rx: Mutex::new(Some(rx)),
        }))
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        *self.inner.state.lock().unwrap() = PeerConnectionState::Connecting;
        Ok(SessionDescription::offer("v=0 fake-offer"))
    }

    async fn set_local_description(&self, description: SessionDescription) -> Result<()> {
        *self.inner.local_description.lock().unwrap() = Some(description);
        Ok(())
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        *self.inner.remote_description.lock().unwrap() = Some(description);
        // The platform transitions once negotiation completes
        *self.inner.state.lock().unwrap() = PeerConnectionState::Connected;
        Ok(())
    }

    fn take_remote_streams(&self) -> Option<mpsc::Receiver<MediaStream>> {
        self.remote_rx.lock().unwrap().take()
    }

    fn state(&self) -> PeerConnectionState {
        *self.inner.state.lock().unwrap()
    }

    fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        *self.inner.state.lock().unwrap() = PeerConnectionState::Closed;
    }
}

pub struct FakeEventChannel {
    inner: Arc<ChannelInner>,
    label: String,
    rx: Mutex<Option<mpsc::Receiver<ChannelSignal>>>,
}

#[async_trait]
impl EventChannel for FakeEventChannel {
    fn label(&self) -> &str {
        &self.label
    }

    fn state(&self) -> ChannelState {
        *self.inner.state.lock().unwrap()
    }

    async fn send(&self, payload: &str) -> Result<()> {
        if self.inner.fail_send.load(Ordering::SeqCst) {
            anyhow::bail!("transport rejected payload");
        }
        self.inner.sent.lock().unwrap().push(payload.to_string());
        Ok(())
    }

    fn take_signals(&self) -> Option<mpsc::Receiver<ChannelSignal>> {
        self.rx.lock().unwrap().take()
    }

    fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        *self.inner.state.lock().unwrap() = ChannelState::Closed;
    }
}

pub struct FakeMediaCapture {
    pub deny: AtomicBool,
    pub stopped: Mutex<Vec<String>>,
    counter: AtomicUsize,
}

impl FakeMediaCapture {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            deny: AtomicBool::new(false),
            stopped: Mutex::new(Vec::new()),
            counter: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl MediaCapture for FakeMediaCapture {
    async fn open_microphone(&self) -> Result<MediaStream> {
        if self.deny.load(Ordering::SeqCst) {
            anyhow::bail!("permission denied");
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MediaStream::new(format!("mic-{n}")))
    }

    fn stop_stream(&self, stream: &MediaStream) {
        self.stopped.lock().unwrap().push(stream.id.clone());
    }
}

pub struct FakePlayback {
    pub attached: Mutex<Option<String>>,
    pub releases: AtomicUsize,
}

impl FakePlayback {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            attached: Mutex::new(None),
            releases: AtomicUsize::new(0),
        })
    }
}

impl AudioPlayback for FakePlayback {
    fn attach(&self, stream: &MediaStream) {
        *self.attached.lock().unwrap() = Some(stream.id.clone());
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        *self.attached.lock().unwrap() = None;
    }
}

// ============================================================================
// Host-side fakes
// ============================================================================

#[derive(Default)]
pub struct RecordingHandler {
    pub statuses: Mutex<Vec<(String, StatusCategory)>>,
    pub messages: Mutex<Vec<(Speaker, String)>>,
    pub errors: Mutex<Vec<String>>,
    pub local_streams: Mutex<Vec<String>>,
    pub remote_streams: Mutex<Vec<String>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<(Speaker, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }

    pub fn statuses(&self) -> Vec<(String, StatusCategory)> {
        self.statuses.lock().unwrap().clone()
    }
}

impl SessionHandler for RecordingHandler {
    fn on_status_change(&self, status: &str, category: StatusCategory) {
        self.statuses
            .lock()
            .unwrap()
            .push((status.to_string(), category));
    }

    fn on_message(&self, speaker: Speaker, text: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((speaker, text.to_string()));
    }

    fn on_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn on_local_stream(&self, stream: &MediaStream) {
        self.local_streams.lock().unwrap().push(stream.id.clone());
    }

    fn on_remote_stream(&self, stream: &MediaStream) {
        self.remote_streams.lock().unwrap().push(stream.id.clone());
    }
}

pub struct FakeExchange {
    pub answer: Mutex<String>,
    pub requests: Mutex<Vec<(String, String)>>,
    pub fail_with: Mutex<Option<String>>,
    /// When set, `exchange` blocks until the gate is notified
    pub gate: Mutex<Option<Arc<Notify>>>,
    /// Notified as soon as `exchange` is entered
    pub entered: Notify,
}

impl FakeExchange {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            answer: Mutex::new("v=0 fake-answer".to_string()),
            requests: Mutex::new(Vec::new()),
            fail_with: Mutex::new(None),
            gate: Mutex::new(None),
            entered: Notify::new(),
        })
    }
}

#[async_trait]
impl DescriptionExchange for FakeExchange {
    async fn exchange(&self, offer_sdp: &str, bearer: &str) -> Result<String, SessionError> {
        self.requests
            .lock()
            .unwrap()
            .push((offer_sdp.to_string(), bearer.to_string()));
        self.entered.notify_one();

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(SessionError::Negotiation(message));
        }
        Ok(self.answer.lock().unwrap().clone())
    }
}

/// A session wired to a full set of fakes.
pub struct SessionFixture {
    pub backend: Arc<FakeRtcBackend>,
    pub capture: Arc<FakeMediaCapture>,
    pub exchange: Arc<FakeExchange>,
    pub playback: Arc<FakePlayback>,
    pub handler: Arc<RecordingHandler>,
    pub session: Arc<ConnectionSession>,
}

impl SessionFixture {
    pub fn new() -> Self {
        let backend = FakeRtcBackend::new();
        let capture = FakeMediaCapture::new();
        let exchange = FakeExchange::new();
        let playback = FakePlayback::new();
        let handler = RecordingHandler::new();

        let session = Arc::new(ConnectionSession::new(
            SessionConfig::default(),
            backend.clone(),
            capture.clone(),
            exchange.clone(),
            playback.clone(),
            handler.clone(),
        ));

        Self {
            backend,
            capture,
            exchange,
            playback,
            handler,
            session,
        }
    }

    pub async fn connect(&self) {
        self.session
            .connect("test-token")
            .await
            .expect("connect failed");
    }

    /// Feed a raw inbound payload through the event channel.
    pub async fn push_server_event(&self, raw: &str) {
        self.backend
            .channel
            .push(ChannelSignal::Message(raw.to_string()))
            .await;
    }
}

// ============================================================================
// Visualizer fakes
// ============================================================================

pub struct AnalyzerInner {
    pub bins: Mutex<Vec<u8>>,
    pub detached: AtomicBool,
}

pub struct FakeAnalyzer {
    pub inner: Arc<AnalyzerInner>,
}

impl FrequencyAnalyzer for FakeAnalyzer {
    fn bin_count(&self) -> usize {
        self.inner.bins.lock().unwrap().len()
    }

    fn fill_frequency_data(&self, out: &mut [u8]) {
        let bins = self.inner.bins.lock().unwrap();
        let n = bins.len().min(out.len());
        out[..n].copy_from_slice(&bins[..n]);
    }

    fn detach(&self) {
        self.inner.detached.store(true, Ordering::SeqCst);
    }
}

pub struct FakeGraph {
    pub analyzers: Mutex<Vec<Arc<AnalyzerInner>>>,
    pub next_bins: Mutex<Vec<u8>>,
    pub closed: AtomicBool,
}

impl FakeGraph {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            analyzers: Mutex::new(Vec::new()),
            next_bins: Mutex::new(vec![0u8; 128]),
            closed: AtomicBool::new(false),
        })
    }

    /// Bin energies the next created analyzer will report.
    pub fn set_next_bins(&self, bins: Vec<u8>) {
        *self.next_bins.lock().unwrap() = bins;
    }

    pub fn analyzer(&self, index: usize) -> Arc<AnalyzerInner> {
        self.analyzers.lock().unwrap()[index].clone()
    }

    pub fn analyzer_count(&self) -> usize {
        self.analyzers.lock().unwrap().len()
    }
}

impl AudioGraph for FakeGraph {
    fn create_analyzer(
        &self,
        _stream: &MediaStream,
        _config: &AnalyzerConfig,
    ) -> Result<Box<dyn FrequencyAnalyzer>> {
        if self.closed.load(Ordering::SeqCst) {
            anyhow::bail!("audio graph closed");
        }
        let inner = Arc::new(AnalyzerInner {
            bins: Mutex::new(self.next_bins.lock().unwrap().clone()),
            detached: AtomicBool::new(false),
        });
        self.analyzers.lock().unwrap().push(inner.clone());
        Ok(Box::new(FakeAnalyzer { inner }))
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct SurfaceOps {
    pub clears: AtomicUsize,
    pub rects: Mutex<Vec<(Rect, Rgba)>>,
    pub gradients: Mutex<Vec<Rect>>,
    pub labels: Mutex<Vec<(String, Rgba)>>,
    pub circles: Mutex<Vec<(f32, f32, Rgba)>>,
    pub lines: AtomicUsize,
}

impl SurfaceOps {
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn labels(&self) -> Vec<(String, Rgba)> {
        self.labels.lock().unwrap().clone()
    }

    pub fn circles(&self) -> Vec<(f32, f32, Rgba)> {
        self.circles.lock().unwrap().clone()
    }

    pub fn gradients(&self) -> Vec<Rect> {
        self.gradients.lock().unwrap().clone()
    }
}

/// Surface that records every draw call for assertions.
pub struct RecordingSurface {
    pub ops: Arc<SurfaceOps>,
    pub dimensions: (f32, f32),
}

impl RecordingSurface {
    pub fn new() -> (Self, Arc<SurfaceOps>) {
        let ops = Arc::new(SurfaceOps::default());
        (
            Self {
                ops: ops.clone(),
                dimensions: (640.0, 120.0),
            },
            ops,
        )
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> (f32, f32) {
        self.dimensions
    }

    fn clear(&mut self) {
        self.ops.clears.fetch_add(1, Ordering::SeqCst);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.ops.rects.lock().unwrap().push((rect, color));
    }

    fn fill_vertical_gradient(&mut self, rect: Rect, _top: Rgba, _mid: Rgba, _bottom: Rgba) {
        self.ops.gradients.lock().unwrap().push(rect);
    }

    fn draw_label(&mut self, text: &str, _x: f32, _y: f32, color: Rgba) {
        self.ops.labels.lock().unwrap().push((text.to_string(), color));
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, _radius: f32, color: Rgba) {
        self.ops.circles.lock().unwrap().push((cx, cy, color));
    }

    fn stroke_line(&mut self, _x1: f32, _y1: f32, _x2: f32, _y2: f32, _color: Rgba) {
        self.ops.lines.fetch_add(1, Ordering::SeqCst);
    }
}
