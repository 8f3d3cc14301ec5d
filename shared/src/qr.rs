use std::io::Cursor;

use image::{GenericImageView, ImageReader, Limits};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{MAX_QR_ALLOC, MAX_QR_BYTES, MAX_QR_DIMENSION};

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum QrImageError {
    #[error("input bytes empty")]
    EmptyInput,

    #[error("input too large: {size} bytes, max {max_size}")]
    InputTooLarge { size: usize, max_size: usize },

    #[error("unsupported image format")]
    UnsupportedFormat,

    #[error("failed to decode image: {reason}")]
    Decode { reason: String },
}

/// What the presenter needs to know about a fetched QR payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub mime_type: &'static str,
}

/// Sniffs and fully decodes a QR payload under fixed limits. The original
/// bytes are what gets stored; decoding only proves they are an image.
pub fn decode_qr_image(bytes: &[u8]) -> Result<DecodedImage, QrImageError> {
    if bytes.is_empty() {
        return Err(QrImageError::EmptyInput);
    }

    if bytes.len() > MAX_QR_BYTES {
        return Err(QrImageError::InputTooLarge {
            size: bytes.len(),
            max_size: MAX_QR_BYTES,
        });
    }

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| QrImageError::Decode {
            reason: e.to_string(),
        })?;

    let format = reader.format().ok_or(QrImageError::UnsupportedFormat)?;

    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_QR_DIMENSION);
    limits.max_image_height = Some(MAX_QR_DIMENSION);
    limits.max_alloc = Some(MAX_QR_ALLOC);
    reader.limits(limits);

    let img = reader.decode().map_err(|e| QrImageError::Decode {
        reason: e.to_string(),
    })?;
    let (width, height) = img.dimensions();

    Ok(DecodedImage {
        width,
        height,
        mime_type: format.to_mime_type(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, image::Rgb([0, 0, 0]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png_dimensions() {
        let decoded = decode_qr_image(&png(29, 29)).unwrap();
        assert_eq!((decoded.width, decoded.height), (29, 29));
        assert_eq!(decoded.mime_type, "image/png");
    }

    #[test]
    fn decodes_jpeg_payloads_too() {
        let img = RgbImage::from_pixel(24, 24, image::Rgb([255, 255, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Jpeg).unwrap();

        let decoded = decode_qr_image(&out.into_inner()).unwrap();
        assert_eq!((decoded.width, decoded.height), (24, 24));
        assert_eq!(decoded.mime_type, "image/jpeg");
    }

    #[test]
    fn rejects_empty_payload() {
        assert_eq!(decode_qr_image(&[]), Err(QrImageError::EmptyInput));
    }

    #[test]
    fn rejects_non_image_payload() {
        let result = decode_qr_image(br#"{"error": "File not found"}"#);
        assert_eq!(result, Err(QrImageError::UnsupportedFormat));
    }

    #[test]
    fn rejects_truncated_png() {
        let mut bytes = png(16, 16);
        bytes.truncate(bytes.len() / 2);
        assert!(matches!(
            decode_qr_image(&bytes),
            Err(QrImageError::Decode { .. })
        ));
    }

    #[test]
    fn rejects_oversized_dimensions() {
        let bytes = png(MAX_QR_DIMENSION + 1, 1);
        assert!(matches!(
            decode_qr_image(&bytes),
            Err(QrImageError::Decode { .. })
        ));
    }
}
