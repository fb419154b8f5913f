//! Window functions and magnitude scaling for spectrum analysis.

use std::f32::consts::PI;

/// Blackman window coefficient (alpha = 0.16)
pub fn blackman_window(index: usize, size: usize) -> f32 {
    const ALPHA: f32 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;
    let x = index as f32 / size as f32;
    a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
}

/// Pre-computed Blackman window of `size` coefficients
pub fn blackman(size: usize) -> Vec<f32> {
    (0..size).map(|i| blackman_window(i, size)).collect()
}

/// Map a linear magnitude onto a byte, linear in decibels
///
/// `min_db` maps to 0 and `max_db` to 255; values outside are clamped.
/// Silence (zero magnitude) is 0.
pub fn magnitude_to_byte(magnitude: f32, min_db: f32, max_db: f32) -> u8 {
    if magnitude <= 0.0 || !magnitude.is_finite() {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 * (db - min_db) / (max_db - min_db);
    scaled.clamp(0.0, 255.0) as u8
}
