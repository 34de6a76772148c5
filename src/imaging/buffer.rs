use image::{ImageBuffer, Rgba};
use thiserror::Error;

use super::regions::RegionDescriptor;

/// An owned RGBA frame. Storage is exactly `width * height * 4` bytes.
pub type PixelBuffer = ImageBuffer<Rgba<u8>, Vec<u8>>;

/// Inputs the segmentation stages refuse to work on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("pixel buffer is empty ({width}x{height})")]
    EmptyBuffer { width: u32, height: u32 },
    #[error("region {region} lies outside the {width}x{height} buffer")]
    RegionOutOfBounds {
        region: RegionDescriptor,
        width: u32,
        height: u32,
    },
    #[error("region {0} has zero width or height")]
    EmptyRegion(RegionDescriptor),
}

/// Brightness bucket of a pixel: the floored, unweighted mean of R, G and B.
///
/// Alpha is ignored. Histogram construction, binarization and region
/// scanning all classify pixels with this one function.
#[inline]
pub fn luminance(pixel: &Rgba<u8>) -> u8 {
    let sum = pixel[0] as u16 + pixel[1] as u16 + pixel[2] as u16;
    (sum / 3) as u8
}

/// Fails with `EmptyBuffer` when the buffer holds no pixels.
pub fn ensure_not_empty(buffer: &PixelBuffer) -> Result<(), PreconditionError> {
    let (width, height) = buffer.dimensions();
    if width == 0 || height == 0 {
        return Err(PreconditionError::EmptyBuffer { width, height });
    }
    Ok(())
}
