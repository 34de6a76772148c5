//! Frame binarization and text-region segmentation.
//!
//! This module provides:
//! - Otsu threshold selection from a 256-bin luminance histogram
//! - In-place binarization to pure black/white
//! - Row-local scanning of dark pixel runs into region descriptors
//! - Deep-copy extraction of each region's pixels
//! - The frame source boundary (image files on disk)

pub mod binarize;
pub mod buffer;
pub mod extract;
pub mod histogram;
pub mod regions;
pub mod source;

pub use binarize::{apply_threshold, binarize};
pub use buffer::{luminance, PixelBuffer, PreconditionError};
pub use extract::extract;
pub use histogram::{compute_histogram, compute_threshold, Histogram};
pub use regions::{scan_regions, RegionDescriptor, FOREGROUND_CUTOFF};
pub use source::{FileFrameSource, Frame, FrameSource, SourceError};
