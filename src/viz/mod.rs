//! Dual-lane audio level visualizer
//!
//! Samples frequency-domain energy for the local (Interviewer) and remote
//! (Assistant) streams and renders stacked bar graphs with speaking
//! activity marks. Audio analysis and drawing both happen behind
//! capability traits so the render math is testable without a platform.

pub mod analyzer;
pub mod surface;
pub mod visualizer;

pub use analyzer::{AnalyzerConfig, AudioGraph, FrequencyAnalyzer};
pub use surface::{DrawSurface, Rect, Rgba};
pub use visualizer::{Lane, LevelVisualizer, VisualizerConfig};
