//! Mask compositing over the normalized original

use std::io::Cursor;

use image::{imageops, imageops::FilterType, DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::error::{AppError, AppResult};

/// Channels per pixel in the raw mask layout
pub const MASK_CHANNELS: usize = 3;

/// MIME type of the composite output
pub const COMPOSITE_MIME: &str = "image/png";

/// Blend a raw anomaly mask over the original image.
///
/// The mask bytes must be exactly `mask_width * mask_height * 3` (RGB at
/// the canonical layout), or the call fails with `MaskDecode`. The mask
/// is resized to the original's dimensions first - a no-op today, since
/// both sides come out of the same canonical resize, but kept so the two
/// resolutions may diverge later. Pure transform: inputs are unmutated
/// and identical inputs produce byte-identical PNG output.
pub fn composite(
    original: &RgbImage,
    raw_mask: &[u8],
    mask_width: u32,
    mask_height: u32,
) -> AppResult<Vec<u8>> {
    let expected = mask_width as usize * mask_height as usize * MASK_CHANNELS;
    if raw_mask.len() != expected {
        return Err(AppError::MaskDecode { expected, actual: raw_mask.len() });
    }

    let mask = RgbImage::from_raw(mask_width, mask_height, raw_mask.to_vec())
        .ok_or(AppError::MaskDecode { expected, actual: raw_mask.len() })?;

    let (width, height) = original.dimensions();
    let mask = if mask.dimensions() == (width, height) {
        mask
    } else {
        imageops::resize(&mask, width, height, FilterType::Triangle)
    };

    let mut blended = RgbImage::new(width, height);
    for (x, y, pixel) in blended.enumerate_pixels_mut() {
        let base = original.get_pixel(x, y);
        let over = mask.get_pixel(x, y);
        *pixel = Rgb([
            overlay_channel(base[0], over[0]),
            overlay_channel(base[1], over[1]),
            overlay_channel(base[2], over[2]),
        ]);
    }

    let mut encoded = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(blended)
        .write_to(&mut encoded, ImageFormat::Png)
        .map_err(|e| AppError::Internal(format!("failed to encode overlay composite: {e}")))?;

    Ok(encoded.into_inner())
}

// Standard overlay blend: multiply for dark base, screen for light base.
fn overlay_channel(base: u8, over: u8) -> u8 {
    let b = u16::from(base);
    let o = u16::from(over);
    if b < 128 {
        ((2 * b * o) / 255) as u8
    } else {
        (255 - (2 * (255 - b) * (255 - o)) / 255) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_mask(width: u32, height: u32, value: [u8; 3]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(width as usize * height as usize * MASK_CHANNELS);
        for _ in 0..(width * height) {
            bytes.extend_from_slice(&value);
        }
        bytes
    }

    #[test]
    fn overlay_formula_spot_values() {
        // multiply branch (base below 128)
        assert_eq!(overlay_channel(100, 255), 200);
        assert_eq!(overlay_channel(100, 0), 0);
        assert_eq!(overlay_channel(0, 255), 0);
        // screen branch (base at or above 128)
        assert_eq!(overlay_channel(200, 255), 255);
        assert_eq!(overlay_channel(200, 0), 145);
        assert_eq!(overlay_channel(255, 0), 255);
        assert_eq!(overlay_channel(128, 0), 1);
    }

    #[test]
    fn composite_applies_overlay_per_pixel() {
        let original = RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]));
        let mask = solid_mask(4, 4, [255, 255, 255]);

        let encoded = composite(&original, &mask, 4, 4).unwrap();
        let decoded = image::load_from_memory(&encoded).unwrap().to_rgb8();

        assert_eq!(decoded.dimensions(), (4, 4));
        for pixel in decoded.pixels() {
            assert_eq!(pixel, &Rgb([200, 200, 200]));
        }
    }

    #[test]
    fn composite_is_byte_identical_for_identical_inputs() {
        let original = RgbImage::from_pixel(6, 3, Rgb([130, 60, 220]));
        let mask = solid_mask(6, 3, [10, 180, 90]);

        let first = composite(&original, &mask, 6, 3).unwrap();
        let second = composite(&original, &mask, 6, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn mask_length_mismatch_is_rejected() {
        let original = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        let result = composite(&original, &[1, 2, 3], 4, 4);
        match result {
            Err(AppError::MaskDecode { expected, actual }) => {
                assert_eq!(expected, 48);
                assert_eq!(actual, 3);
            }
            other => panic!("expected MaskDecode, got {other:?}"),
        }
    }

    #[test]
    fn mask_is_resized_to_the_original_dimensions() {
        let original = RgbImage::from_pixel(8, 8, Rgb([100, 100, 100]));
        // Mask at half resolution, uniform so the resample is exact.
        let mask = solid_mask(4, 4, [255, 255, 255]);

        let encoded = composite(&original, &mask, 4, 4).unwrap();
        let decoded = image::load_from_memory(&encoded).unwrap().to_rgb8();

        assert_eq!(decoded.dimensions(), (8, 8));
        assert_eq!(decoded.get_pixel(3, 3), &Rgb([200, 200, 200]));
    }

    #[test]
    fn inputs_are_not_mutated() {
        let original = RgbImage::from_pixel(4, 4, Rgb([50, 100, 150]));
        let mask = solid_mask(4, 4, [255, 0, 128]);
        let original_before = original.clone();
        let mask_before = mask.clone();

        composite(&original, &mask, 4, 4).unwrap();

        assert_eq!(original, original_before);
        assert_eq!(mask, mask_before);
    }
}
