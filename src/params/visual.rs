//! Mapping from the amplitude metric to mesh scale and distortion.

use crate::error::{AudioError, Result};

/// Upper bound of the amplitude metric (byte-valued spectrum bins)
pub const METRIC_MAX: f32 = 255.0;

/// Caller-side smoothing and scaling of the amplitude metric
#[derive(Debug, Clone)]
pub struct VisualMapping {
    /// Per-frame lerp rate toward the latest metric (0.0 exclusive ..= 1.0)
    /// 1.0 = follow the metric exactly
    pub metric_response: f32,

    /// Mesh scale at silence
    pub base_scale: f32,

    /// Extra scale at full-scale metric
    /// Formula: scale = base_scale + (metric / 255) * scale_gain
    pub scale_gain: f32,

    /// Distortion at full-scale metric, result clamped to 0..=1
    /// Formula: distort = (metric / 255) * distort_gain
    pub distort_gain: f32,
}

impl Default for VisualMapping {
    fn default() -> Self {
        Self {
            metric_response: 0.25,
            base_scale: 1.0,
            scale_gain: 0.8,
            distort_gain: 0.6,
        }
    }
}

impl VisualMapping {
    /// Mesh scale for a (smoothed) metric
    pub fn scale_for(&self, metric: f32) -> f32 {
        self.base_scale + normalize(metric) * self.scale_gain
    }

    /// Distortion factor for a (smoothed) metric
    pub fn distort_for(&self, metric: f32) -> f32 {
        (normalize(metric) * self.distort_gain).clamp(0.0, 1.0)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.metric_response > 0.0 && self.metric_response <= 1.0) {
            return Err(AudioError::Config(format!(
                "metric_response must be within (0, 1], got {}",
                self.metric_response
            )));
        }
        if self.base_scale <= 0.0 {
            return Err(AudioError::Config("base_scale must be > 0".to_string()));
        }
        Ok(())
    }
}

fn normalize(metric: f32) -> f32 {
    metric.clamp(0.0, METRIC_MAX) / METRIC_MAX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_maps_to_base_scale() {
        let mapping = VisualMapping::default();
        assert_eq!(mapping.scale_for(0.0), mapping.base_scale);
        assert_eq!(mapping.distort_for(0.0), 0.0);
    }

    #[test]
    fn test_full_scale_metric() {
        let mapping = VisualMapping::default();
        assert!((mapping.scale_for(255.0) - 1.8).abs() < 1e-6);
        assert!((mapping.distort_for(255.0) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_metric_is_clamped() {
        let mapping = VisualMapping {
            distort_gain: 4.0,
            ..Default::default()
        };
        assert_eq!(mapping.distort_for(1000.0), 1.0);
        assert_eq!(mapping.scale_for(-5.0), mapping.base_scale);
    }
}
