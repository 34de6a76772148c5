use image::Rgba;

use super::buffer::{luminance, PixelBuffer, PreconditionError};
use super::histogram::compute_threshold;

const BLACK: u8 = 0;
const WHITE: u8 = 255;

/// Rewrites every pixel to pure black or pure white, in place.
///
/// Pixels whose luminance is below `threshold` become black (text), all
/// others white (background). Alpha is left untouched. A threshold of 0
/// turns every pixel white.
pub fn apply_threshold(buffer: &mut PixelBuffer, threshold: u8) {
    for pixel in buffer.pixels_mut() {
        let value = if luminance(pixel) < threshold { BLACK } else { WHITE };
        let Rgba([r, g, b, _]) = pixel;
        *r = value;
        *g = value;
        *b = value;
    }
}

/// Computes the Otsu threshold of `buffer`, applies it in place and returns it.
pub fn binarize(buffer: &mut PixelBuffer) -> Result<u8, PreconditionError> {
    let threshold = compute_threshold(buffer)?;
    apply_threshold(buffer, threshold);
    Ok(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_threshold() {
        let mut buffer = PixelBuffer::new(3, 1);
        buffer.put_pixel(0, 0, Rgba([100, 100, 100, 255])); // below → black
        buffer.put_pixel(1, 0, Rgba([120, 120, 120, 40])); // equal → white
        buffer.put_pixel(2, 0, Rgba([250, 10, 10, 7])); // mean 90 → black

        apply_threshold(&mut buffer, 120);

        assert_eq!(*buffer.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*buffer.get_pixel(1, 0), Rgba([255, 255, 255, 40]), "alpha must be kept");
        assert_eq!(*buffer.get_pixel(2, 0), Rgba([0, 0, 0, 7]));
    }

    #[test]
    fn test_uses_same_floor_as_histogram() {
        // Mean is 99.67, bucket 99: below a threshold of 100.
        let mut buffer = PixelBuffer::from_pixel(1, 1, Rgba([99, 100, 100, 255]));
        apply_threshold(&mut buffer, 100);
        assert_eq!(buffer.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_zero_threshold_whitens_everything() {
        let mut buffer = PixelBuffer::from_pixel(4, 2, Rgba([0, 0, 0, 255]));
        let threshold = binarize(&mut buffer).unwrap();

        assert_eq!(threshold, 0);
        assert!(buffer.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_threshold_is_idempotent() {
        let original = PixelBuffer::from_fn(16, 16, |x, y| {
            let v = ((x * 16 + y * 3) % 256) as u8;
            Rgba([v, v.wrapping_mul(3), 255 - v, 255])
        });

        for threshold in [0u8, 1, 64, 128, 200, 255] {
            let mut once = original.clone();
            apply_threshold(&mut once, threshold);
            let mut twice = once.clone();
            apply_threshold(&mut twice, threshold);
            assert_eq!(once, twice, "threshold {}", threshold);
        }
    }

    #[test]
    fn test_binarized_output_is_fixed_point_for_nonzero_thresholds() {
        let mut buffer = PixelBuffer::from_fn(4, 4, |x, _| {
            if x < 2 { Rgba([0, 0, 0, 255]) } else { Rgba([255, 255, 255, 255]) }
        });
        let before = buffer.clone();

        for threshold in 1..=255u8 {
            apply_threshold(&mut buffer, threshold);
            assert_eq!(buffer, before, "threshold {}", threshold);
        }
    }

    #[test]
    fn test_binarize_two_tone_with_noise() {
        // Dark text pixels at 30/40 and paper at 220/230.
        let mut buffer = PixelBuffer::from_fn(4, 1, |x, _| {
            let v = [30u8, 40, 220, 230][x as usize];
            Rgba([v, v, v, 255])
        });

        let threshold = binarize(&mut buffer).unwrap();

        assert_eq!(threshold, 40);
        assert_eq!(buffer.get_pixel(0, 0)[0], 0);
        // The darkest class's top bucket sits on the threshold itself.
        assert_eq!(buffer.get_pixel(1, 0)[0], 255);
        assert_eq!(buffer.get_pixel(2, 0)[0], 255);
        assert_eq!(buffer.get_pixel(3, 0)[0], 255);
    }

    #[test]
    fn test_binarize_rejects_empty_buffer() {
        let mut buffer = PixelBuffer::new(0, 3);
        assert!(binarize(&mut buffer).is_err());
    }
}
