//! Image decoding and PNG encoding at the pipeline boundary.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, PNM) and produces an RGBA
//! image for the processing stages; encodes stage outputs back to PNG.
//! The core stages never touch bytes or files.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use crate::types::PipelineError;

/// Decode raw image bytes into 8-bit RGBA.
///
/// Any format the enabled `image` codecs recognize is accepted. Color
/// types other than RGBA8 are converted; images without alpha become
/// fully opaque.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
#[must_use = "returns the decoded image"]
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}

/// Encode an RGBA image as PNG bytes.
///
/// # Errors
///
/// Returns [`PipelineError::ImageEncode`] if the PNG encoder rejects the
/// image.
#[must_use = "returns the encoded PNG bytes"]
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, PipelineError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| PipelineError::ImageEncode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn empty_input_returns_error() {
        let result = decode_rgba(&[]);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode_rgba(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn png_bytes_start_with_signature() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn encoded_png_decodes_to_the_same_pixels() {
        let img = RgbaImage::from_fn(17, 31, |x, y| {
            Rgba([
                u8::try_from(x).unwrap(),
                u8::try_from(y).unwrap(),
                128,
                u8::try_from(255 - x).unwrap(),
            ])
        });
        let decoded = decode_rgba(&encode_png(&img).unwrap()).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn opaque_formats_decode_with_full_alpha() {
        // 2x1 binary PPM: one red pixel, one blue pixel.
        let mut ppm = b"P6\n2 1\n255\n".to_vec();
        ppm.extend_from_slice(&[255, 0, 0, 0, 0, 255]);
        let decoded = decode_rgba(&ppm).unwrap();
        assert_eq!(*decoded.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*decoded.get_pixel(1, 0), Rgba([0, 0, 255, 255]));
    }
}
