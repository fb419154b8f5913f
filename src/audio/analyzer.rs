//! Spectrum analyzer: decode once, loop playback, analyze on demand.
//!
//! Playback position is derived from a [`Clock`], so analysis keeps running
//! whether or not the audible output is connected.

use std::sync::Arc;
use std::time::Duration;

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::decode::{self, AudioAsset};
use super::fft::{blackman, magnitude_to_byte};
use super::output::{AudioSink, PlaybackFeed};
use crate::error::{AudioError, Result};
use crate::params::AnalyzerConfig;

/// One looping playback of an [`AudioAsset`]
#[derive(Debug)]
pub struct PlaybackSession {
    asset: Arc<AudioAsset>,
    /// Clock reading when the loop started
    started_at: Duration,
    looping: bool,
    connected: bool,
}

impl PlaybackSession {
    pub fn asset(&self) -> &Arc<AudioAsset> {
        &self.asset
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Whether the playback is routed to the audible output
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Frames played since the loop started (not wrapped)
    fn elapsed_frames(&self, now: Duration) -> usize {
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() * self.asset.sample_rate() as f64) as usize
    }
}

/// Frequency analysis over a looping decoded asset
pub struct SpectrumAnalyzer {
    config: AnalyzerConfig,
    clock: Box<dyn Clock>,
    sink: Box<dyn AudioSink>,

    /// FFT instance
    fft: Arc<dyn Fft<f32>>,

    /// Blackman window coefficients
    window: Vec<f32>,

    /// FFT complex buffer
    fft_buffer: Vec<Complex<f32>>,

    /// FFT scratch buffer
    scratch_buffer: Vec<Complex<f32>>,

    /// Smoothed linear magnitudes (half of FFT size)
    smoothed: Vec<f32>,

    /// Byte spectrum handed out by `snapshot`, refreshed in place
    snapshot: Vec<u8>,

    /// Playhead frame of the last transform
    last_frame: Option<usize>,

    started: bool,
}

impl SpectrumAnalyzer {
    /// Create an analyzer on the system clock
    pub fn new(config: AnalyzerConfig, sink: Box<dyn AudioSink>) -> Result<Self> {
        Self::with_clock(config, sink, Box::new(SystemClock::new()))
    }

    /// Create an analyzer driven by an explicit clock
    pub fn with_clock(
        config: AnalyzerConfig,
        sink: Box<dyn AudioSink>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let fft_size = config.fft_size;
        let bins = config.bin_count();
        let fft = FftPlanner::<f32>::new().plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();

        debug!(
            "SpectrumAnalyzer created: fft_size={}, bins={}, smoothing={}",
            fft_size, bins, config.smoothing_time_constant
        );

        Ok(Self {
            fft,
            window: blackman(fft_size),
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch_buffer: vec![Complex::new(0.0, 0.0); scratch_len],
            smoothed: vec![0.0; bins],
            snapshot: vec![0; bins],
            last_frame: None,
            started: false,
            config,
            clock,
            sink,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Decode raw bytes into a playable asset
    pub fn initialize(&self, raw: &[u8]) -> Result<Arc<AudioAsset>> {
        decode::decode(raw).map(Arc::new)
    }

    /// Start looping playback of `asset` from its beginning
    ///
    /// An analyzer drives exactly one playback; a second call fails.
    pub fn start_loop(&mut self, asset: Arc<AudioAsset>) -> Result<PlaybackSession> {
        if self.started {
            return Err(AudioError::invalid_state("start_loop", "already started"));
        }
        self.started = true;
        self.last_frame = None;
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
        self.snapshot.iter_mut().for_each(|b| *b = 0);

        info!(
            "Playback loop started ({:.2}s loop)",
            asset.duration().as_secs_f32()
        );

        Ok(PlaybackSession {
            asset,
            started_at: self.clock.now(),
            looping: true,
            connected: false,
        })
    }

    /// Byte spectrum of the audio just before the playhead
    ///
    /// Never waits: if the playhead has not moved since the previous call
    /// the previous result is returned untouched. The slice is overwritten
    /// by the next call.
    pub fn snapshot(&mut self, session: &PlaybackSession) -> &[u8] {
        let head = session.elapsed_frames(self.clock.now());
        if self.last_frame == Some(head) {
            return &self.snapshot;
        }
        self.last_frame = Some(head);

        let fft_size = self.config.fft_size;
        let asset = &session.asset;

        // Window ends at the playhead; time before the loop started is silence
        for (i, slot) in self.fft_buffer.iter_mut().enumerate() {
            let sample = (head + i)
                .checked_sub(fft_size)
                .map_or(0.0, |frame| asset.mono(frame));
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch_buffer);

        let tau = self.config.smoothing_time_constant;
        let norm_factor = 1.0 / fft_size as f32;

        for (i, (smoothed, byte)) in self
            .smoothed
            .iter_mut()
            .zip(self.snapshot.iter_mut())
            .enumerate()
        {
            let magnitude = self.fft_buffer[i].norm() * norm_factor;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
            if !smoothed.is_finite() {
                *smoothed = 0.0;
            }
            *byte = magnitude_to_byte(
                *smoothed,
                self.config.min_decibels,
                self.config.max_decibels,
            );
        }

        &self.snapshot
    }

    /// Route the playback to the audible output
    ///
    /// Returns whether sound is now playing. Refusal is logged and
    /// swallowed; analysis continues either way.
    pub fn connect_output(&mut self, session: &mut PlaybackSession) -> bool {
        if session.connected {
            return true;
        }

        let frames = session.asset.frames();
        let feed = PlaybackFeed {
            asset: Arc::clone(&session.asset),
            start_frame: session.elapsed_frames(self.clock.now()) % frames,
        };

        match self.sink.connect(feed) {
            Ok(()) => {
                session.connected = true;
                info!("Audio output connected");
                true
            }
            Err(err) => {
                warn!("Audio output unavailable, continuing muted: {}", err);
                false
            }
        }
    }

    /// Detach the playback from the audible output (idempotent)
    pub fn disconnect_output(&mut self, session: &mut PlaybackSession) {
        if session.connected || self.sink.is_connected() {
            self.sink.disconnect();
            debug!("Audio output detached");
        }
        session.connected = false;
    }
}
