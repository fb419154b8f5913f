//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::audio::{AudioSink, CpalSink, NullSink};
use crate::params::{AnalyzerConfig, AppConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Vibesphere")]
#[command(about = "Audio-reactive sphere driven by a looping track", long_about = None)]
pub struct Args {
    /// Audio file to loop (mp3, wav, flac, ogg)
    #[arg(value_name = "AUDIO")]
    pub audio: PathBuf,

    /// FFT size (power of 2, 32..=32768)
    #[arg(long, value_name = "SIZE", default_value_t = AnalyzerConfig::default().fft_size)]
    pub fft_size: usize,

    /// Number of lowest frequency bins averaged into the amplitude
    #[arg(long, value_name = "BINS", default_value_t = AnalyzerConfig::default().bass_bins)]
    pub bass_bins: usize,

    /// Spectral smoothing between frames (0..=1)
    #[arg(long, value_name = "FACTOR", default_value_t = AnalyzerConfig::default().smoothing_time_constant)]
    pub smoothing: f32,

    /// Analyze without producing sound
    #[arg(long)]
    pub mute: bool,

    /// Run without a window, starting immediately
    #[arg(long)]
    pub headless: bool,

    /// Frames to run in headless mode
    #[arg(long, value_name = "COUNT", default_value = "600")]
    pub frames: u64,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, value_name = "FILTER", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Scene configuration with the command-line overrides applied
    pub fn app_config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.analyzer.fft_size = self.fft_size;
        config.analyzer.bass_bins = self.bass_bins;
        config.analyzer.smoothing_time_constant = self.smoothing;
        config
    }

    /// Output sink selected by `--mute`
    pub fn sink(&self) -> Box<dyn AudioSink> {
        if self.mute {
            Box::new(NullSink::new())
        } else {
            Box::new(CpalSink::new())
        }
    }
}
