//! Audio decoding, looping playback and spectrum analysis.
//!
//! Decodes a track once, loops it on a clock-derived playhead, and reduces
//! the spectrum under the playhead to a bass-weighted amplitude value once
//! per rendered frame.

mod analyzer;
mod clock;
mod decode;
mod fft;
mod output;
mod session;
mod tracker;

// Re-export public types
pub use analyzer::{PlaybackSession, SpectrumAnalyzer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use decode::{decode, AudioAsset};
pub use fft::{blackman_window, magnitude_to_byte};
pub use output::{AudioSink, CpalSink, NullSink, PlaybackFeed};
pub use session::{AudioSession, OutputStatus, SessionState};
pub use tracker::{reduce, AmplitudeTracker};

#[cfg(test)]
pub(crate) use decode::test_support;
