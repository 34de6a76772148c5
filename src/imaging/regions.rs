//! Row-local region scanning.
//!
//! Walks a binarized frame row by row and bounds every horizontal run of
//! dark pixels with a one-row-high rectangle. Runs are never merged across
//! rows: a tall glyph produces one region per row it touches.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::buffer::{luminance, PixelBuffer};

/// Pixels with a luminance below this value count as foreground (dark).
///
/// This is a fixed midpoint for already-binarized input, not the Otsu
/// threshold used to binarize it.
pub const FOREGROUND_CUTOFF: u8 = 128;

/// Axis-aligned rectangle in source-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionDescriptor {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RegionDescriptor {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True if the region is non-empty and lies entirely inside a
    /// `width` x `height` buffer.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width >= 1
            && self.height >= 1
            && self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

impl fmt::Display for RegionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

#[inline]
fn is_foreground(pixel: &image::Rgba<u8>) -> bool {
    luminance(pixel) < FOREGROUND_CUTOFF
}

/// Collects the dark runs of a binarized buffer, ordered by row then column.
///
/// A run opens at its first dark pixel and grows rightward one pixel at a
/// time. It is closed by the first light pixel after it or by the end of
/// its row, whichever comes first.
pub fn scan_regions(buffer: &PixelBuffer) -> Vec<RegionDescriptor> {
    let mut regions = Vec::new();

    for (y, row) in buffer.rows().enumerate() {
        let mut open: Option<RegionDescriptor> = None;

        for (x, pixel) in row.enumerate() {
            if is_foreground(pixel) {
                match open.as_mut() {
                    Some(region) => region.width += 1,
                    None => open = Some(RegionDescriptor::new(x as u32, y as u32, 1, 1)),
                }
            } else if let Some(region) = open.take() {
                regions.push(region);
            }
        }

        // Regions never span rows.
        if let Some(region) = open.take() {
            regions.push(region);
        }
    }

    log::debug!(
        "Scanned {}x{} frame: {} regions",
        buffer.width(),
        buffer.height(),
        regions.len()
    );

    regions
}
