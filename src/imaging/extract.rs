use image::imageops;

use super::buffer::{PixelBuffer, PreconditionError};
use super::regions::RegionDescriptor;

/// Copies the pixels under `region` into a new, independent buffer.
///
/// All four channels are copied unchanged. The region must be non-empty and
/// lie entirely inside `buffer`; nothing is clamped.
pub fn extract(
    buffer: &PixelBuffer,
    region: &RegionDescriptor,
) -> Result<PixelBuffer, PreconditionError> {
    if region.width == 0 || region.height == 0 {
        return Err(PreconditionError::EmptyRegion(*region));
    }

    let (width, height) = buffer.dimensions();
    if !region.fits_within(width, height) {
        return Err(PreconditionError::RegionOutOfBounds {
            region: *region,
            width,
            height,
        });
    }

    Ok(imageops::crop_imm(buffer, region.x, region.y, region.width, region.height).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, (x + y) as u8, 200]))
    }

    #[test]
    fn test_extract_copies_window() {
        let source = gradient(10, 6);
        let region = RegionDescriptor::new(3, 2, 4, 3);

        let sub = extract(&source, &region).unwrap();

        assert_eq!(sub.dimensions(), (4, 3));
        for (x, y, pixel) in sub.enumerate_pixels() {
            assert_eq!(pixel, source.get_pixel(x + 3, y + 2));
        }
    }

    #[test]
    fn test_extract_whole_buffer() {
        let source = gradient(5, 5);
        let sub = extract(&source, &RegionDescriptor::new(0, 0, 5, 5)).unwrap();
        assert_eq!(sub, source);
    }

    #[test]
    fn test_extract_is_deep_copy() {
        let source = gradient(4, 4);
        let snapshot = source.clone();

        let mut sub = extract(&source, &RegionDescriptor::new(1, 1, 2, 2)).unwrap();
        sub.put_pixel(0, 0, Rgba([9, 9, 9, 9]));

        assert_eq!(source, snapshot);
        assert_eq!(*source.get_pixel(1, 1), Rgba([1, 1, 2, 200]));
    }

    #[test]
    fn test_extract_rejects_out_of_bounds() {
        let source = gradient(4, 2);
        let region = RegionDescriptor::new(2, 0, 3, 1);

        assert_eq!(
            extract(&source, &region),
            Err(PreconditionError::RegionOutOfBounds {
                region,
                width: 4,
                height: 2,
            })
        );
    }

    #[test]
    fn test_extract_rejects_empty_region() {
        let source = gradient(4, 2);
        let region = RegionDescriptor::new(0, 0, 0, 1);
        assert_eq!(
            extract(&source, &region),
            Err(PreconditionError::EmptyRegion(region))
        );
    }
}
