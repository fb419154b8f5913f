//! Parameter definitions with units and documented semantics.
//!
//! All tunables live here with:
//! - Units (Hz, dBFS, world units, per-frame rates)
//! - Documented ranges and meanings
//! - A `validate()` that runs before any audio work starts

mod audio;
mod camera;
mod render;
mod visual;

use crate::error::Result;

// Re-export all types
pub use audio::{AnalyzerConfig, MAX_FFT_SIZE, MIN_FFT_SIZE};
pub use camera::CameraConfig;
pub use render::WindowConfig;
pub use visual::{VisualMapping, METRIC_MAX};

/// Complete configuration of one visualizer scene
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub analyzer: AnalyzerConfig,
    pub camera: CameraConfig,
    pub visual: VisualMapping,
}

impl AppConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.analyzer.validate()?;
        self.camera.validate()?;
        self.visual.validate()?;
        Ok(())
    }
}
