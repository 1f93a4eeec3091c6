use anyhow::Result;
use serde::Deserialize;

use crate::session::SessionConfig;
use crate::viz::{AnalyzerConfig, VisualizerConfig};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub visualizer: VisualizerSettings,
}

#[derive(Debug, Deserialize)]
pub struct RealtimeConfig {
    /// Offer/answer exchange endpoint
    pub exchange_url: String,
    /// Model requested from the realtime service
    pub model: String,
    /// Host-local token endpoint
    pub token_url: String,
    /// Event channel label
    pub channel_label: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            exchange_url: session.exchange_url,
            model: session.model,
            token_url: "http://localhost:8001/api/token".to_string(),
            channel_label: session.channel_label,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VisualizerSettings {
    /// Delay between draw ticks in milliseconds
    pub frame_interval_ms: u64,
}

impl Default for VisualizerSettings {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Per-session view of the realtime settings, with a fresh session id
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            session_id: format!("interview-{}", uuid::Uuid::new_v4()),
            exchange_url: self.realtime.exchange_url.clone(),
            model: self.realtime.model.clone(),
            channel_label: self.realtime.channel_label.clone(),
        }
    }

    pub fn visualizer_config(&self) -> VisualizerConfig {
        VisualizerConfig {
            analyzer: AnalyzerConfig::default(),
            frame_interval: std::time::Duration::from_millis(self.visualizer.frame_interval_ms),
        }
    }
}
