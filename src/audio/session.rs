//! Audio session: one decoded track, looping, sampled once per frame.

use std::sync::Arc;

use tracing::{debug, info, trace};

use super::analyzer::{PlaybackSession, SpectrumAnalyzer};
use super::clock::Clock;
use super::decode::AudioAsset;
use super::output::AudioSink;
use super::tracker::AmplitudeTracker;
use crate::error::{AudioError, Result};
use crate::params::AnalyzerConfig;

/// Lifecycle of an [`AudioSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    /// Playing and analyzed, not audible
    Open,
    /// Playing, analyzed and audible
    Connected,
    Closed,
}

impl SessionState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Unopened => "unopened",
            Self::Open => "open",
            Self::Connected => "connected",
            Self::Closed => "closed",
        }
    }
}

/// Outcome of [`AudioSession::connect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStatus {
    Audible,
    /// The platform refused output; visuals keep running silently
    Muted,
}

/// Owns the analyzer, its output and the playback for one scene
///
/// Each session is its own audio context: nothing is shared between
/// sessions.
pub struct AudioSession {
    analyzer: SpectrumAnalyzer,
    tracker: AmplitudeTracker,
    playback: Option<PlaybackSession>,
    state: SessionState,
    last_metric: f32,
}

impl AudioSession {
    /// Create an unopened session on the system clock
    pub fn new(config: AnalyzerConfig, sink: Box<dyn AudioSink>) -> Result<Self> {
        let tracker = AmplitudeTracker::new(config.bass_bins);
        Ok(Self::from_analyzer(SpectrumAnalyzer::new(config, sink)?, tracker))
    }

    /// Create an unopened session driven by an explicit clock
    pub fn with_clock(
        config: AnalyzerConfig,
        sink: Box<dyn AudioSink>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        let tracker = AmplitudeTracker::new(config.bass_bins);
        Ok(Self::from_analyzer(
            SpectrumAnalyzer::with_clock(config, sink, clock)?,
            tracker,
        ))
    }

    fn from_analyzer(analyzer: SpectrumAnalyzer, tracker: AmplitudeTracker) -> Self {
        Self {
            analyzer,
            tracker,
            playback: None,
            state: SessionState::Unopened,
            last_metric: 0.0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Most recent value returned by [`Self::tick`] (0 before the first)
    pub fn last_metric(&self) -> f32 {
        self.last_metric
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Decode `raw` and start looping it
    ///
    /// Decode failures are returned and leave the session unopened.
    pub fn open(&mut self, raw: &[u8]) -> Result<()> {
        self.expect_unopened("open")?;
        let asset = self.analyzer.initialize(raw)?;
        self.open_asset(asset)
    }

    /// Start looping an asset that was decoded ahead of time
    pub fn open_asset(&mut self, asset: Arc<AudioAsset>) -> Result<()> {
        self.expect_unopened("open")?;
        self.playback = Some(self.analyzer.start_loop(asset)?);
        self.state = SessionState::Open;
        info!("Audio session open");
        Ok(())
    }

    /// Make the playback audible
    ///
    /// A refused output is not an error: the session stays open and
    /// `tick` keeps working. Only misuse (unopened/closed) fails.
    pub fn connect(&mut self) -> Result<OutputStatus> {
        match self.state {
            SessionState::Connected => Ok(OutputStatus::Audible),
            SessionState::Open => {
                let Some(playback) = self.playback.as_mut() else {
                    return Err(AudioError::invalid_state("connect", "open without playback"));
                };
                if self.analyzer.connect_output(playback) {
                    self.state = SessionState::Connected;
                    Ok(OutputStatus::Audible)
                } else {
                    Ok(OutputStatus::Muted)
                }
            }
            state => Err(AudioError::invalid_state("connect", state.name())),
        }
    }

    /// Amplitude metric for the current frame
    ///
    /// Call once per rendered frame. Outside open/connected this returns
    /// [`AudioError::InvalidState`] and does no analysis.
    pub fn tick(&mut self) -> Result<f32> {
        match (self.state, self.playback.as_ref()) {
            (SessionState::Open | SessionState::Connected, Some(playback)) => {
                let snapshot = self.analyzer.snapshot(playback);
                let metric = self.tracker.measure(snapshot);
                self.last_metric = metric;
                trace!("amplitude metric {:.2}", metric);
                Ok(metric)
            }
            (state, _) => Err(AudioError::invalid_state("tick", state.name())),
        }
    }

    /// Disconnect output and end the session (idempotent)
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if let Some(mut playback) = self.playback.take() {
            self.analyzer.disconnect_output(&mut playback);
        }
        debug!("Audio session closed (was {})", self.state.name());
        self.state = SessionState::Closed;
    }

    fn expect_unopened(&self, operation: &'static str) -> Result<()> {
        if self.state == SessionState::Unopened {
            Ok(())
        } else {
            Err(AudioError::invalid_state(operation, self.state.name()))
        }
    }
}

impl Drop for AudioSession {
    fn drop(&mut self) {
        self.close();
    }
}
