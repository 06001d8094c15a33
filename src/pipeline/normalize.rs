//! Image normalization to the canonical detection resolution

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, ImageFormat, RgbImage};

use crate::error::{AppError, AppResult};

/// An image resampled to the canonical resolution, kept in both encoded
/// form (for detection submission) and decoded form (for compositing).
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// Re-encoded bytes at the canonical resolution
    pub encoded: Vec<u8>,
    /// MIME type of `encoded`
    pub mime_type: &'static str,
    /// Decoded RGB raster, dimensions equal to the canonical resolution
    pub pixels: RgbImage,
}

/// Resample an encoded image to exactly `target_width` x `target_height`.
///
/// The resize stretches rather than letterboxes, matching the reference
/// deployment: detection and mask alignment both assume the full canvas.
/// JPEG input stays JPEG; every other decodable format is re-encoded as
/// PNG, since the `image` crate cannot encode all formats it decodes.
pub fn normalize(buffer: &[u8], target_width: u32, target_height: u32) -> AppResult<NormalizedImage> {
    let source_format = image::guess_format(buffer).map_err(|e| AppError::Decode(e.to_string()))?;
    let decoded = image::load_from_memory_with_format(buffer, source_format)?;

    let resized = decoded.resize_exact(target_width, target_height, FilterType::Triangle);
    let pixels = resized.to_rgb8();

    let (encode_format, mime_type) = match source_format {
        ImageFormat::Jpeg => (ImageFormat::Jpeg, "image/jpeg"),
        _ => (ImageFormat::Png, "image/png"),
    };

    let mut encoded = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(pixels.clone())
        .write_to(&mut encoded, encode_format)
        .map_err(|e| AppError::Internal(format!("failed to encode normalized image: {e}")))?;

    Ok(NormalizedImage {
        encoded: encoded.into_inner(),
        mime_type,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([40, 80, 120]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn output_always_has_target_dimensions() {
        for (w, h) in [(10, 10), (640, 480), (3, 97)] {
            let normalized = normalize(&png_bytes(w, h), 32, 64).unwrap();
            assert_eq!(normalized.pixels.dimensions(), (32, 64));

            let decoded = image::load_from_memory(&normalized.encoded).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (32, 64));
        }
    }

    #[test]
    fn jpeg_input_stays_jpeg() {
        let img = RgbImage::from_pixel(20, 20, Rgb([200, 10, 10]));
        let mut jpeg = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut jpeg, ImageFormat::Jpeg)
            .unwrap();

        let normalized = normalize(&jpeg.into_inner(), 16, 16).unwrap();
        assert_eq!(normalized.mime_type, "image/jpeg");
        assert_eq!(image::guess_format(&normalized.encoded).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn png_input_stays_png() {
        let normalized = normalize(&png_bytes(8, 8), 16, 16).unwrap();
        assert_eq!(normalized.mime_type, "image/png");
    }

    #[test]
    fn undecodable_input_is_a_decode_error() {
        let result = normalize(b"definitely not an image", 16, 16);
        assert!(matches!(result, Err(AppError::Decode(_))));
    }

    #[test]
    fn handles_single_channel_mask_style_input() {
        // Masks travel through the same resize path as photographs.
        let gray = image::GrayImage::from_pixel(12, 12, image::Luma([255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(gray)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();

        let normalized = normalize(&out.into_inner(), 6, 6).unwrap();
        assert_eq!(normalized.pixels.dimensions(), (6, 6));
        assert_eq!(normalized.pixels.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }
}
