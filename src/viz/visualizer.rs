use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::analyzer::{AnalyzerConfig, AudioGraph, FrequencyAnalyzer};
use super::surface::{DrawSurface, Rect, Rgba};
use crate::rtc::MediaStream;

// Lane identity colors and chrome
const LOCAL_LANE_COLOR: Rgba = Rgba::rgb(0x3b, 0x82, 0xf6);
const REMOTE_LANE_COLOR: Rgba = Rgba::rgb(0x8b, 0x5c, 0xf6);
const ACTIVE_DOT_COLOR: Rgba = Rgba::rgb(0x10, 0xb9, 0x81);
const IDLE_LABEL_COLOR: Rgba = Rgba::rgb(0x9c, 0xa3, 0xaf);
const DIVIDER_COLOR: Rgba = Rgba::rgb(0xe5, 0xe7, 0xeb);
const BACKGROUND_COLOR: Rgba = Rgba::rgb(0xf8, 0xf9, 0xfa).with_alpha(0.95);

// Bar geometry and activity detection
const BAR_HEIGHT_SCALE: f32 = 0.8; // bars use up to 80% of the lane band
const BAR_WIDTH_FACTOR: f32 = 2.5;
const BAR_GAP: f32 = 2.0;
const GRADIENT_ALPHA: [f32; 3] = [0.25, 0.5, 0.8];

/// Mean bin energy (out of 255) above which a lane counts as speaking
const ACTIVITY_THRESHOLD: f32 = 10.0;

/// Identity of a visualizer lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    /// Interviewer microphone
    Local,
    /// Assistant playback
    Remote,
}

impl Lane {
    pub fn label(self) -> &'static str {
        match self {
            Lane::Local => "Interviewer",
            Lane::Remote => "Assistant",
        }
    }

    pub fn color(self) -> Rgba {
        match self {
            Lane::Local => LOCAL_LANE_COLOR,
            Lane::Remote => REMOTE_LANE_COLOR,
        }
    }

    fn index(self) -> usize {
        match self {
            Lane::Local => 0,
            Lane::Remote => 1,
        }
    }
}

/// Settings for the visualizer
#[derive(Debug, Clone)]
pub struct VisualizerConfig {
    pub analyzer: AnalyzerConfig,

    /// Delay between draw ticks
    pub frame_interval: Duration,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            frame_interval: Duration::from_millis(16),
        }
    }
}

/// One lane's analysis pipeline; exists iff its stream has been supplied
struct LaneState {
    analyzer: Box<dyn FrequencyAnalyzer>,
    bins: Vec<u8>,
}

/// State shared with the draw task
struct Shared {
    lanes: Mutex<[Option<LaneState>; 2]>,
    surface: Mutex<Box<dyn DrawSurface>>,
    active: AtomicBool,
}

impl Shared {
    /// Render one frame: background, per-lane bars + activity mark, divider
    fn render_frame(&self) {
        let mut surface = self.surface.lock();
        let (width, height) = surface.size();
        let band_height = height / 2.0;

        surface.clear();
        surface.fill_rect(
            Rect {
                x: 0.0,
                y: 0.0,
                width,
                height,
            },
            BACKGROUND_COLOR,
        );

        let mut lanes = self.lanes.lock();
        for lane in [Lane::Local, Lane::Remote] {
            if let Some(state) = lanes[lane.index()].as_mut() {
                state.analyzer.fill_frequency_data(&mut state.bins);
                draw_lane(surface.as_mut(), lane, &state.bins, width, band_height);
            }
        }

        surface.stroke_line(0.0, band_height, width, band_height, DIVIDER_COLOR);
    }
}

/// Real-time two-lane frequency bar-graph
///
/// Lanes are created lazily as streams arrive; the draw task starts with
/// the first lane and runs until [`stop`] flips the active flag.
///
/// [`stop`]: LevelVisualizer::stop
pub struct LevelVisualizer {
    graph: Arc<dyn AudioGraph>,
    config: VisualizerConfig,
    shared: Arc<Shared>,
    draw_task: Mutex<Option<JoinHandle<()>>>,
    disposed: AtomicBool,
}

impl LevelVisualizer {
    pub fn new(graph: Arc<dyn AudioGraph>, surface: Box<dyn DrawSurface>) -> Self {
        Self::with_config(graph, surface, VisualizerConfig::default())
    }

    pub fn with_config(
        graph: Arc<dyn AudioGraph>,
        surface: Box<dyn DrawSurface>,
        config: VisualizerConfig,
    ) -> Self {
        Self {
            graph,
            config,
            shared: Arc::new(Shared {
                lanes: Mutex::new([None, None]),
                surface: Mutex::new(surface),
                active: AtomicBool::new(false),
            }),
            draw_task: Mutex::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    /// Attach the interviewer microphone stream to the local lane
    pub fn connect_local_stream(&self, stream: &MediaStream) -> Result<()> {
        self.connect_lane(Lane::Local, stream)
    }

    /// Attach the assistant playback stream to the remote lane
    pub fn connect_remote_stream(&self, stream: &MediaStream) -> Result<()> {
        self.connect_lane(Lane::Remote, stream)
    }

    fn connect_lane(&self, lane: Lane, stream: &MediaStream) -> Result<()> {
        if self.disposed.load(Ordering::SeqCst) {
            anyhow::bail!("visualizer already disposed");
        }

        let analyzer = self.graph.create_analyzer(stream, &self.config.analyzer)?;
        let bins = vec![0u8; analyzer.bin_count()];

        {
            let mut lanes = self.shared.lanes.lock();
            // Replacing a stream detaches the previous pipeline first
            if let Some(previous) = lanes[lane.index()].take() {
                previous.analyzer.detach();
            }
            lanes[lane.index()] = Some(LaneState { analyzer, bins });
        }

        info!("{} lane connected to stream {}", lane.label(), stream.id);
        self.ensure_draw_task();
        Ok(())
    }

    /// Halt the draw loop and release every lane pipeline; idempotent
    pub fn stop(&self) {
        self.shared.active.store(false, Ordering::SeqCst);
        if let Some(task) = self.draw_task.lock().take() {
            task.abort();
        }

        {
            let mut lanes = self.shared.lanes.lock();
            for slot in lanes.iter_mut() {
                if let Some(state) = slot.take() {
                    state.analyzer.detach();
                }
            }
        }

        self.shared.surface.lock().clear();
    }

    /// Stop, then release the shared audio graph; terminal
    pub fn dispose(&self) {
        self.stop();
        if !self.disposed.swap(true, Ordering::SeqCst) {
            debug!("Releasing audio graph");
            self.graph.close();
        }
    }

    fn ensure_draw_task(&self) {
        if self.shared.active.swap(true, Ordering::SeqCst) {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let frame_interval = self.config.frame_interval;

        let task = tokio::spawn(async move {
            debug!("Draw task started");
            let mut ticker = tokio::time::interval(frame_interval);
            loop {
                ticker.tick().await;
                // The active flag is the cooperative cancellation point
                if !shared.active.load(Ordering::SeqCst) {
                    break;
                }
                shared.render_frame();
            }
            debug!("Draw task stopped");
        });
        *self.draw_task.lock() = Some(task);
    }
}

/// Draw one lane's bars and its activity mark into its half-height band
fn draw_lane(surface: &mut dyn DrawSurface, lane: Lane, bins: &[u8], width: f32, band_height: f32) {
    if bins.is_empty() {
        return;
    }

    let y_offset = lane.index() as f32 * band_height;
    let bar_width = width / bins.len() as f32 * BAR_WIDTH_FACTOR;

    let color = lane.color();
    let top = color.with_alpha(GRADIENT_ALPHA[0]);
    let mid = color.with_alpha(GRADIENT_ALPHA[1]);
    let bottom = color.with_alpha(GRADIENT_ALPHA[2]);

    let mut x = 0.0;
    for &bin in bins {
        let bar_height = f32::from(bin) / 255.0 * band_height * BAR_HEIGHT_SCALE;
        surface.fill_vertical_gradient(
            Rect {
                x,
                y: y_offset + (band_height - bar_height) / 2.0,
                width: bar_width - BAR_GAP,
                height: bar_height,
            },
            top,
            mid,
            bottom,
        );
        x += bar_width;
    }

    let active = mean_energy(bins) > ACTIVITY_THRESHOLD;
    let label_color = if active { color } else { IDLE_LABEL_COLOR };
    surface.draw_label(lane.label(), 10.0, y_offset + 15.0, label_color);
    if active {
        surface.fill_circle(width - 20.0, y_offset + 12.0, 4.0, ACTIVE_DOT_COLOR);
    }
}

fn mean_energy(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    bins.iter().map(|&bin| f32::from(bin)).sum::<f32>() / bins.len() as f32
}
