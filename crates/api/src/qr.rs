//! QR code rendering for check-in links.
//!
//! The link is encoded at error-correction level M and rendered as a
//! grayscale PNG, then base64-encoded so it can travel inside a JSON body
//! and be dropped straight into a `data:image/png;base64,` URL.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};

/// Minimum edge length of the rendered PNG, in pixels. The quiet zone is
/// included.
pub const QR_CODE_SIZE: u32 = 256;

#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// Render `data` as a QR code PNG.
pub fn render_png(data: &str) -> Result<Vec<u8>, QrError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_CODE_SIZE, QR_CODE_SIZE)
        .build();

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// Render `data` as a QR code PNG and base64-encode it.
pub fn render_png_base64(data: &str) -> Result<String, QrError> {
    Ok(STANDARD.encode(render_png(data)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost:5173/checkin?session=S20261018ABCDEFGH";

    #[test]
    fn renders_a_square_png_of_at_least_the_minimum_size() {
        let png = render_png(URL).expect("rendering should succeed");
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png)
            .expect("output should be a valid PNG");

        assert_eq!(decoded.width(), decoded.height());
        assert!(decoded.width() >= QR_CODE_SIZE);
    }

    #[test]
    fn base64_output_decodes_to_the_same_png() {
        let encoded = render_png_base64(URL).expect("rendering should succeed");
        let bytes = STANDARD.decode(&encoded).expect("output should be valid base64");
        assert_eq!(bytes, render_png(URL).unwrap());
    }

    #[test]
    fn different_links_render_differently() {
        let a = render_png(URL).unwrap();
        let b = render_png("http://localhost:5173/checkin?session=S20261018ZZZZZZZZ").unwrap();
        assert_ne!(a, b);
    }
}
