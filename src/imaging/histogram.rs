//! Luminance histogram and Otsu threshold selection.

use super::buffer::{ensure_not_empty, luminance, PixelBuffer, PreconditionError};

/// Number of luminance buckets.
pub const BUCKETS: usize = 256;

/// One count per pixel, indexed by luminance bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; BUCKETS],
}

impl Histogram {
    pub fn counts(&self) -> &[u64; BUCKETS] {
        &self.counts
    }

    /// Total number of pixels counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Picks the bucket that maximizes between-class variance.
    ///
    /// Candidates are scanned from 0 upward. Buckets before the first
    /// populated one are skipped and the scan stops as soon as no foreground
    /// pixels remain. Only a strictly greater variance replaces the current
    /// best, so the lowest of several equal maxima wins. Returns 0 when no
    /// candidate qualifies (every pixel in one bucket).
    pub fn otsu_threshold(&self) -> u8 {
        let total = self.total() as f64;
        let weighted_sum: f64 = self
            .counts
            .iter()
            .enumerate()
            .map(|(bucket, &count)| bucket as f64 * count as f64)
            .sum();

        let mut weight_background = 0.0f64;
        let mut sum_background = 0.0f64;
        let mut max_variance = 0.0f64;
        let mut threshold = 0u8;

        for (t, &count) in self.counts.iter().enumerate() {
            weight_background += count as f64;
            if weight_background == 0.0 {
                continue;
            }

            let weight_foreground = total - weight_background;
            if weight_foreground == 0.0 {
                break;
            }

            sum_background += t as f64 * count as f64;
            let mean_background = sum_background / weight_background;
            let mean_foreground = (weighted_sum - sum_background) / weight_foreground;

            let delta = mean_background - mean_foreground;
            let variance = weight_background * weight_foreground * delta * delta;
            if variance > max_variance {
                max_variance = variance;
                threshold = t as u8;
            }
        }

        threshold
    }
}

/// Builds the 256-bucket luminance histogram of a buffer.
pub fn compute_histogram(buffer: &PixelBuffer) -> Histogram {
    let mut counts = [0u64; BUCKETS];
    for pixel in buffer.pixels() {
        counts[luminance(pixel) as usize] += 1;
    }
    Histogram { counts }
}

/// Computes the Otsu threshold of a non-empty buffer.
pub fn compute_threshold(buffer: &PixelBuffer) -> Result<u8, PreconditionError> {
    ensure_not_empty(buffer)?;
    let threshold = compute_histogram(buffer).otsu_threshold();
    log::debug!(
        "Otsu threshold for {}x{} frame: {}",
        buffer.width(),
        buffer.height(),
        threshold
    );
    Ok(threshold)
}
