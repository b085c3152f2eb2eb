//! Image decoding and grayscale conversion.
//!
//! Accepts raw image bytes (JPEG or PNG) and produces a single-channel
//! grayscale image suitable for the processing pipeline.
//!
//! This is the first step in the pipeline: raw bytes in, `GrayImage` out.

use image::GrayImage;

use crate::types::SegError;

/// Decode raw image bytes and convert to grayscale.
///
/// Supports JPEG and PNG (whatever the `image` crate can decode).
/// Color images are reduced with the standard luminance formula:
/// `0.299*R + 0.587*G + 0.114*B`.
///
/// # Errors
///
/// Returns [`SegError::InvalidImage`] if `bytes` is empty or the
/// decoded image has zero area.
/// Returns [`SegError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_and_grayscale(bytes: &[u8]) -> Result<GrayImage, SegError> {
    if bytes.is_empty() {
        return Err(SegError::InvalidImage("empty input".to_string()));
    }

    let img = image::load_from_memory(bytes)?.to_luma8();
    if img.width() == 0 || img.height() == 0 {
        return Err(SegError::InvalidImage("zero-area image".to_string()));
    }
    Ok(img)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Encode a grayscale image as PNG bytes.
    fn encode_png(img: &GrayImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::L8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_invalid_image() {
        let result = decode_and_grayscale(&[]);
        assert!(matches!(result, Err(SegError::InvalidImage(_))));
    }

    #[test]
    fn corrupt_bytes_return_decode_error() {
        let result = decode_and_grayscale(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(SegError::ImageDecode(_))));
    }

    #[test]
    fn output_dimensions_match_input() {
        let img = GrayImage::from_pixel(17, 31, image::Luma([128]));
        let gray = decode_and_grayscale(&encode_png(&img)).unwrap();
        assert_eq!(gray.width(), 17);
        assert_eq!(gray.height(), 31);
    }

    #[test]
    fn color_image_converts_with_weighted_luminance() {
        // Green carries the highest luminance weight, blue the lowest.
        let channel_value = |r: u8, g: u8, b: u8| {
            let img = image::RgbImage::from_pixel(1, 1, image::Rgb([r, g, b]));
            let mut buf = Vec::new();
            let encoder = image::codecs::png::PngEncoder::new(&mut buf);
            image::ImageEncoder::write_image(
                encoder,
                img.as_raw(),
                1,
                1,
                image::ExtendedColorType::Rgb8,
            )
            .unwrap();
            decode_and_grayscale(&buf).unwrap().get_pixel(0, 0).0[0]
        };

        let r = channel_value(255, 0, 0);
        let g = channel_value(0, 255, 0);
        let b = channel_value(0, 0, 255);
        assert!(
            g > r && r > b,
            "expected green > red > blue luminance, got R={r} G={g} B={b}",
        );
    }
}
