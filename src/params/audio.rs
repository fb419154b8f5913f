//! Spectrum analysis configuration.

use crate::error::{AudioError, Result};

/// Smallest transform size accepted by the analyzer
pub const MIN_FFT_SIZE: usize = 32;

/// Largest transform size accepted by the analyzer
pub const MAX_FFT_SIZE: usize = 32768;

/// Spectrum analyzer configuration
///
/// Transform size and reduction window are both tunable: the two shipped
/// variants of the demo disagree (256 vs 4096 point transforms).
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// FFT window size (must be power of 2, 32..=32768)
    /// Larger = finer frequency resolution, higher cost per snapshot
    pub fft_size: usize,

    /// Number of lowest bins averaged into the amplitude metric (`k`)
    pub bass_bins: usize,

    /// Blend factor between the previous and current transform (0.0..=1.0)
    /// 0.0 = no smoothing, values near 1.0 = very sluggish spectrum
    pub smoothing_time_constant: f32,

    /// Magnitude (dBFS) mapped to byte value 0
    pub min_decibels: f32,

    /// Magnitude (dBFS) mapped to byte value 255
    pub max_decibels: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            bass_bins: 10,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyzerConfig {
    /// Number of bins in a spectrum snapshot
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Width of one frequency bin (Hz) at the given sample rate
    pub fn bin_resolution_hz(&self, sample_rate_hz: u32) -> f32 {
        sample_rate_hz as f32 / self.fft_size as f32
    }

    /// Convert frequency (Hz) to FFT bin index
    pub fn hz_to_bin(&self, hz: f32, sample_rate_hz: u32) -> usize {
        ((hz * self.fft_size as f32) / sample_rate_hz as f32) as usize
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two() {
            return Err(AudioError::Config(format!(
                "FFT size must be power of 2, got {}",
                self.fft_size
            )));
        }
        if !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size) {
            return Err(AudioError::Config(format!(
                "FFT size must be within {}..={}, got {}",
                MIN_FFT_SIZE, MAX_FFT_SIZE, self.fft_size
            )));
        }
        if self.bass_bins == 0 {
            return Err(AudioError::Config("Bass bins must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            return Err(AudioError::Config(format!(
                "Smoothing time constant must be within 0..=1, got {}",
                self.smoothing_time_constant
            )));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(AudioError::Config(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bin_count(), 128);
    }

    #[test]
    fn test_hz_to_bin() {
        let config = AnalyzerConfig {
            fft_size: 1024,
            ..Default::default()
        };

        // At 44100 Hz sample rate and 1024 FFT size:
        // Bin resolution = 44100 / 1024 ≈ 43.07 Hz per bin
        assert_eq!(config.hz_to_bin(0.0, 44100), 0);
        assert_eq!(config.hz_to_bin(43.07, 44100), 1);
        assert_eq!(config.hz_to_bin(100.0, 44100), 2);
        assert!((config.bin_resolution_hz(44100) - 43.066).abs() < 0.01);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let not_pow2 = AnalyzerConfig {
            fft_size: 300,
            ..Default::default()
        };
        assert!(matches!(not_pow2.validate(), Err(AudioError::Config(_))));

        let too_small = AnalyzerConfig {
            fft_size: 16,
            ..Default::default()
        };
        assert!(too_small.validate().is_err());

        let no_bins = AnalyzerConfig {
            bass_bins: 0,
            ..Default::default()
        };
        assert!(no_bins.validate().is_err());

        let bad_smoothing = AnalyzerConfig {
            smoothing_time_constant: 1.5,
            ..Default::default()
        };
        assert!(bad_smoothing.validate().is_err());

        let inverted_db = AnalyzerConfig {
            min_decibels: -20.0,
            max_decibels: -40.0,
            ..Default::default()
        };
        assert!(inverted_db.validate().is_err());
    }

    #[test]
    fn test_large_variant_is_valid() {
        let config = AnalyzerConfig {
            fft_size: 4096,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.bin_count(), 2048);
    }
}
