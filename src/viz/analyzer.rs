use anyhow::Result;

use crate::rtc::MediaStream;

/// Analysis settings for a lane's frequency pipeline
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Transform window size in samples; the analyzer exposes half as
    /// many frequency bins
    pub fft_size: usize,

    /// Temporal smoothing factor applied by the platform analyser
    pub smoothing: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing: 0.8,
        }
    }
}

impl AnalyzerConfig {
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

/// Frequency-domain view of one audio stream
pub trait FrequencyAnalyzer: Send {
    fn bin_count(&self) -> usize;

    /// Copy the current per-bin energy (0-255) into `out`
    fn fill_frequency_data(&self, out: &mut [u8]);

    /// Disconnect from the source stream
    fn detach(&self);
}

/// Shared audio-processing context for both lanes
///
/// Created once by the host and reused for every analyzer; `close`
/// releases the context and is terminal.
pub trait AudioGraph: Send + Sync {
    fn create_analyzer(
        &self,
        stream: &MediaStream,
        config: &AnalyzerConfig,
    ) -> Result<Box<dyn FrequencyAnalyzer>>;

    fn close(&self);
}
