//! Image encoding: `DynamicImage` → base64 JPEG wrapped in [`ImagePayload`].
//!
//! Vision APIs accept images as base64 strings embedded in the JSON request
//! body. A resume page is mostly text on a white background, so a quality-75
//! JPEG stays small while remaining perfectly legible to the model.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// MIME type of every payload produced by this crate.
pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// Default JPEG quality (matches the usual encoder default).
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// A single rasterised page, ready to attach to a model request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Always [`JPEG_MIME_TYPE`].
    pub mime_type: String,
    /// Standard (padded) base64 of the JPEG bytes.
    pub data: String,
}

impl ImagePayload {
    /// Decode the base64 body back into raw JPEG bytes.
    pub fn decoded(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.data)
    }
}

impl From<ImagePayload> for ImageData {
    fn from(payload: ImagePayload) -> Self {
        let ImagePayload { mime_type, data } = payload;
        ImageData::new(data, mime_type.as_str()).with_detail("high")
    }
}

/// Encode a rendered page as a base64 JPEG payload.
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<ImagePayload, image::ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
        encoder.encode_image(&rgb)?;
    }

    let data = STANDARD.encode(&buf);
    debug!(
        "Encoded {}x{} page → {} bytes JPEG, {} bytes base64",
        rgb.width(),
        rgb.height(),
        buf.len(),
        data.len()
    );

    Ok(ImagePayload {
        mime_type: JPEG_MIME_TYPE.to_string(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn red_square() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn encode_small_image() {
        let payload = encode_jpeg(&red_square(), DEFAULT_JPEG_QUALITY).expect("encode should succeed");
        assert_eq!(payload.mime_type, "image/jpeg");
        assert!(!payload.data.is_empty());

        let bytes = payload.decoded().expect("valid base64");
        // SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(
            image::guess_format(&bytes).expect("known format"),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn decoded_jpeg_keeps_dimensions() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 24, Rgba([0, 0, 0, 128])));
        let payload = encode_jpeg(&img, 90).unwrap();
        let decoded = image::load_from_memory(&payload.decoded().unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 24));
    }

    #[test]
    fn out_of_range_quality_is_clamped() {
        assert!(encode_jpeg(&red_square(), 0).is_ok());
        assert!(encode_jpeg(&red_square(), 255).is_ok());
    }

    #[test]
    fn payload_serialises_with_snake_case_fields() {
        let payload = ImagePayload {
            mime_type: JPEG_MIME_TYPE.into(),
            data: "AAAA".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["mime_type"], "image/jpeg");
        assert_eq!(json["data"], "AAAA");
    }
}
