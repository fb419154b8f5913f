//! Audible output: routing a looping playback to the sound device.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use tracing::{debug, error, info};

use super::decode::AudioAsset;
use crate::error::{AudioError, Result};

/// What a sink should play: the asset, looping from `start_frame`
///
/// Once connected, the device clock paces the audible loop while the
/// analyzer follows its own [`Clock`](super::Clock). The two start aligned
/// at `start_frame` but device startup latency and clock skew are not
/// corrected afterwards, so over long runs the visuals can lead or trail
/// the sound by a few milliseconds.
#[derive(Debug, Clone)]
pub struct PlaybackFeed {
    pub asset: Arc<AudioAsset>,
    pub start_frame: usize,
}

/// Destination for audible playback
///
/// `connect` may be refused by the platform (no device, autoplay policy);
/// callers treat that as "muted", never as fatal.
pub trait AudioSink {
    /// Start producing sound for `feed`
    fn connect(&mut self, feed: PlaybackFeed) -> Result<()>;

    /// Stop producing sound; must be idempotent
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;
}

/// Sink that accepts every connection and produces nothing
///
/// Used for headless runs and `--mute`.
#[derive(Debug, Default)]
pub struct NullSink {
    connected: bool,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSink for NullSink {
    fn connect(&mut self, _feed: PlaybackFeed) -> Result<()> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Default output device through cpal
#[derive(Default)]
pub struct CpalSink {
    /// Audio output stream (kept alive while connected)
    stream: Option<cpal::Stream>,
}

impl CpalSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSink for CpalSink {
    fn connect(&mut self, feed: PlaybackFeed) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::OutputConnect("No audio output device found".to_string()))?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::OutputConnect(format!("Failed to get audio config: {}", e)))?;

        let sample_format = config.sample_format();
        let device_rate = config.sample_rate().0;
        let device_channels = config.channels() as usize;

        info!(
            "Audio output: {} @ {}Hz, {} ch, {:?}",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            device_rate,
            device_channels,
            sample_format
        );

        let cursor = LoopCursor::new(feed, device_rate);
        let config: cpal::StreamConfig = config.into();
        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, cursor, device_channels),
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, cursor, device_channels),
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, cursor, device_channels),
            cpal::SampleFormat::I32 => build_stream::<i32>(&device, &config, cursor, device_channels),
            other => {
                return Err(AudioError::OutputConnect(format!(
                    "Unsupported output sample format {:?}",
                    other
                )))
            }
        }?;

        stream
            .play()
            .map_err(|e| AudioError::OutputConnect(format!("Failed to start audio stream: {}", e)))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                debug!("Pausing audio stream before drop failed: {}", e);
            }
            debug!("Audio output disconnected");
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Output stream writing `cursor` in the device's native sample type
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut cursor: LoopCursor,
    device_channels: usize,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32> + 'static,
{
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                cursor.fill(data, device_channels);
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| AudioError::OutputConnect(format!("Failed to build audio stream: {}", e)))
}

/// Looping read position with linear rate conversion to the device rate
struct LoopCursor {
    asset: Arc<AudioAsset>,
    /// Fractional frame position inside the asset
    position: f64,
    /// Asset frames advanced per device frame
    step: f64,
}

impl LoopCursor {
    fn new(feed: PlaybackFeed, device_rate: u32) -> Self {
        let step = feed.asset.sample_rate() as f64 / device_rate.max(1) as f64;
        let position = (feed.start_frame % feed.asset.frames()) as f64;
        Self {
            asset: feed.asset,
            position,
            step,
        }
    }

    /// Fill an interleaved device buffer, mapping source channels onto device channels
    fn fill<T: Sample + FromSample<f32>>(&mut self, out: &mut [T], out_channels: usize) {
        let frames = self.asset.frames() as f64;
        let src_channels = self.asset.channels();

        for frame in out.chunks_mut(out_channels.max(1)) {
            let index = self.position as usize;
            let frac = (self.position - index as f64) as f32;
            let current = self.asset.frame(index);
            let next = self.asset.frame(index + 1);

            for (ch, sample) in frame.iter_mut().enumerate() {
                let src = ch % src_channels;
                *sample = T::from_sample(current[src] + (next[src] - current[src]) * frac);
            }

            self.position = (self.position + self.step) % frames;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_asset(channels: usize, sample_rate: u32) -> Arc<AudioAsset> {
        let samples: Vec<f32> = (0..4 * channels).map(|i| (i / channels) as f32).collect();
        Arc::new(AudioAsset::from_interleaved(samples, channels, sample_rate).unwrap())
    }

    #[test]
    fn test_null_sink_connect_disconnect() {
        let mut sink = NullSink::new();
        let feed = PlaybackFeed {
            asset: ramp_asset(1, 8000),
            start_frame: 0,
        };
        sink.connect(feed).unwrap();
        assert!(sink.is_connected());
        sink.disconnect();
        sink.disconnect();
        assert!(!sink.is_connected());
    }

    #[test]
    fn test_cursor_loops_at_same_rate() {
        let feed = PlaybackFeed {
            asset: ramp_asset(1, 8000),
            start_frame: 2,
        };
        let mut cursor = LoopCursor::new(feed, 8000);
        let mut out = [0.0f32; 6];
        cursor.fill(&mut out, 1);
        assert_eq!(out, [2.0, 3.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_cursor_upsamples_and_duplicates_mono() {
        let feed = PlaybackFeed {
            asset: ramp_asset(1, 4000),
            start_frame: 0,
        };
        let mut cursor = LoopCursor::new(feed, 8000);
        let mut out = [0.0f32; 8];
        cursor.fill(&mut out, 2);
        // Half-frame steps, linearly interpolated, mono copied to both channels
        assert_eq!(out, [0.0, 0.0, 0.5, 0.5, 1.0, 1.0, 1.5, 1.5]);
    }

    #[test]
    fn test_cursor_start_frame_wraps() {
        let feed = PlaybackFeed {
            asset: ramp_asset(2, 8000),
            start_frame: 9,
        };
        let mut cursor = LoopCursor::new(feed, 8000);
        let mut out = [0.0f32; 2];
        cursor.fill(&mut out, 2);
        assert_eq!(out, [1.0, 1.0]);
    }

    #[test]
    fn test_cursor_converts_to_integer_samples() {
        let samples = vec![0.5, -0.5, 0.0, 1.0];
        let asset = Arc::new(AudioAsset::from_interleaved(samples, 1, 8000).unwrap());
        let mut cursor = LoopCursor::new(PlaybackFeed { asset, start_frame: 0 }, 8000);

        let mut out = [0i16; 4];
        cursor.fill(&mut out, 1);
        assert!((out[0] - 16384).abs() <= 1, "{:?}", out);
        assert!((out[1] + 16384).abs() <= 1, "{:?}", out);
        assert_eq!(out[2], 0);
        assert_eq!(out[3], i16::MAX);

        let mut out = [0u16; 1];
        cursor.fill(&mut out, 1);
        // Unsigned samples are centred on 32768
        assert!((out[0] as i32 - 49152).abs() <= 1, "{:?}", out);
    }

    #[test]
    fn test_cursor_adds_no_drift_over_many_loops() {
        let feed = PlaybackFeed {
            asset: ramp_asset(1, 8000),
            start_frame: 1,
        };
        let mut cursor = LoopCursor::new(feed, 8000);

        // 1000 full passes over the 4-frame asset, in uneven device buffers
        let mut out = vec![0.0f32; 7];
        let mut written = 0;
        while written + out.len() <= 4000 {
            cursor.fill(&mut out, 1);
            written += out.len();
        }
        let mut rest = vec![0.0f32; 4000 - written];
        cursor.fill(&mut rest, 1);

        let mut next = [0.0f32; 1];
        cursor.fill(&mut next, 1);
        assert_eq!(next, [1.0]);
    }
}
