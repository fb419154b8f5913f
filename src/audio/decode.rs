//! Decoding raw bytes into an immutable, in-memory audio asset.

use std::io::{Cursor, ErrorKind};
use std::time::Duration;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::error::{AudioError, Result};

/// Fully decoded audio, interleaved `f32` samples
///
/// Immutable once built; shared between the analyzer and the output sink.
#[derive(Debug, Clone)]
pub struct AudioAsset {
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
}

impl AudioAsset {
    /// Build an asset from interleaved samples
    pub fn from_interleaved(mut samples: Vec<f32>, channels: usize, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(AudioError::Decode("Audio has no channels".to_string()));
        }
        if sample_rate == 0 {
            return Err(AudioError::Decode("Sample rate must be > 0".to_string()));
        }
        samples.truncate(samples.len() - samples.len() % channels);
        if samples.is_empty() {
            return Err(AudioError::Decode("Audio contains no samples".to_string()));
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    /// Number of sample frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Length of one pass through the asset
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// All channels of one frame; `index` wraps around the loop point
    pub fn frame(&self, index: usize) -> &[f32] {
        let start = (index % self.frames()) * self.channels;
        &self.samples[start..start + self.channels]
    }

    /// Down-mixed (channel average) value of one frame; wraps like [`Self::frame`]
    pub fn mono(&self, index: usize) -> f32 {
        self.frame(index).iter().sum::<f32>() / self.channels as f32
    }
}

/// Decode a complete encoded file held in memory
///
/// Corrupt packets are skipped; a stream that yields no samples at all is
/// a decode failure.
pub fn decode(bytes: &[u8]) -> Result<AudioAsset> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let detected = symphonia::default::get_probe().format(
        &Hint::new(),
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = detected.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioError::Decode("No audio track found".to_string()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut sample_rate = codec_params.sample_rate;
    let mut channels = codec_params.channels.map(|c| c.count());
    let mut decoder =
        symphonia::default::get_codecs().make(&codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = Vec::new();
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err)) if err.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(err.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate.get_or_insert(spec.rate);
                channels.get_or_insert(spec.channels.count());

                let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                sample_buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(sample_buf.samples());
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                skipped_packets += 1;
                warn!("Skipping corrupt audio packet: {}", msg);
            }
            Err(err) => return Err(err.into()),
        }
    }

    let sample_rate =
        sample_rate.ok_or_else(|| AudioError::Decode("Unknown sample rate".to_string()))?;
    let channels = channels.ok_or_else(|| AudioError::Decode("Unknown channel layout".to_string()))?;
    let asset = AudioAsset::from_interleaved(samples, channels, sample_rate)?;

    debug!(
        "Decoded audio: {} frames, {} ch @ {}Hz ({:.2}s, {} packets skipped)",
        asset.frames(),
        asset.channels(),
        asset.sample_rate(),
        asset.duration().as_secs_f32(),
        skipped_packets
    );

    Ok(asset)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Cursor;

    /// Encode a sine tone as 16-bit PCM WAV bytes
    pub fn sine_wav(freq_hz: f32, amplitude: f32, secs: f32, sample_rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            let frames = (secs * sample_rate as f32) as usize;
            for i in 0..frames {
                let t = i as f32 / sample_rate as f32;
                let value = (2.0 * std::f32::consts::PI * freq_hz * t).sin() * amplitude;
                let sample = (value * i16::MAX as f32) as i16;
                for _ in 0..channels {
                    writer.write_sample(sample).unwrap();
                }
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    /// Silent WAV bytes
    pub fn silent_wav(secs: f32, sample_rate: u32) -> Vec<u8> {
        sine_wav(0.0, 0.0, secs, sample_rate, 1)
    }
}
