//! Scroll-driven camera configuration.

use glam::Vec3;

use crate::error::{AudioError, Result};

/// Camera targets and per-state interpolation rates
///
/// Rates are the fraction of the remaining distance covered each frame.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Resting position when zoomed out (world units)
    pub far_target: Vec3,

    /// Position when zoomed in (world units)
    pub near_target: Vec3,

    /// Per-frame interpolation rate toward `far_target` (0.0 exclusive ..= 1.0)
    pub far_rate: f32,

    /// Per-frame interpolation rate toward `near_target` (0.0 exclusive ..= 1.0)
    /// Faster than `far_rate`: zooming in reads as snappier than drifting out
    pub near_rate: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            far_target: Vec3::new(0.0, 0.0, 3.0), // Initial demo camera position
            near_target: Vec3::new(0.0, 0.0, 1.6),
            far_rate: 0.03,
            near_rate: 0.08,
        }
    }
}

impl CameraConfig {
    /// Validate configuration (rates must be usable interpolation factors)
    pub fn validate(&self) -> Result<()> {
        for (name, rate) in [("far_rate", self.far_rate), ("near_rate", self.near_rate)] {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(AudioError::Config(format!(
                    "{} must be within (0, 1], got {}",
                    name, rate
                )));
            }
        }
        if !self.far_target.is_finite() || !self.near_target.is_finite() {
            return Err(AudioError::Config(
                "Camera targets must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
