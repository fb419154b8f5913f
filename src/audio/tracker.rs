//! Bass-weighted reduction of a spectrum to one amplitude value.

/// Mean of the first `min(k, len)` bins of `snapshot`
///
/// Pure: no state carried between frames. An empty window yields 0.
pub fn reduce(snapshot: &[u8], k: usize) -> f32 {
    let window = &snapshot[..k.min(snapshot.len())];
    if window.is_empty() {
        return 0.0;
    }
    let sum: u32 = window.iter().map(|&b| b as u32).sum();
    sum as f32 / window.len() as f32
}

/// Reduces each frame's spectrum to the amplitude metric
///
/// Only the lowest bins count: that is where the rhythmic energy is.
/// Any smoothing across frames is the caller's business.
#[derive(Debug, Clone, Copy)]
pub struct AmplitudeTracker {
    bass_bins: usize,
}

impl AmplitudeTracker {
    pub fn new(bass_bins: usize) -> Self {
        Self { bass_bins }
    }

    pub fn bass_bins(&self) -> usize {
        self.bass_bins
    }

    pub fn measure(&self, snapshot: &[u8]) -> f32 {
        reduce(snapshot, self.bass_bins)
    }
}
