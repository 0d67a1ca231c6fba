// 🔳 QR Encoder - payload text → PNG raster + data URI
// Fixed look: 300px square, 2-module margin, black on white

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use qrcode::{Color, EcLevel, QrCode};
use std::io::Cursor;
use thiserror::Error;

/// File name used for downloads and shares
pub const EXPORT_FILE_NAME: &str = "mobile-price-qr.png";

pub const PNG_MIME: &str = "image/png";

#[derive(Debug, Error)]
pub enum QrError {
    #[error("cannot encode payload as a QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("cannot write QR image as PNG: {0}")]
    Png(#[from] image::ImageError),

    #[error("cannot encode an empty payload")]
    EmptyPayload,
}

// ============================================================================
// STYLE
// ============================================================================

/// Visual parameters of the rendered image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrStyle {
    /// Width and height of the output image in pixels
    pub size_px: u32,
    /// Quiet zone around the symbol, in modules
    pub margin_modules: u32,
    pub dark: [u8; 4],
    pub light: [u8; 4],
    pub ec_level: EcLevel,
}

impl Default for QrStyle {
    fn default() -> Self {
        QrStyle {
            size_px: 300,
            margin_modules: 2,
            dark: [0x00, 0x00, 0x00, 0xff],
            light: [0xff, 0xff, 0xff, 0xff],
            ec_level: EcLevel::M,
        }
    }
}

// ============================================================================
// QR IMAGE
// ============================================================================

/// An encoded QR image together with the exact payload it encodes.
///
/// The payload is only reachable through the image, so a displayed image
/// can never be paired with some other text.
#[derive(Debug, Clone)]
pub struct QrImage {
    payload: String,
    png: Vec<u8>,
    size_px: u32,
    /// Row-major dark flags, `module_count * module_count` entries
    modules: Vec<bool>,
    module_count: usize,
    generated_at: DateTime<Utc>,
}

impl QrImage {
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn size_px(&self) -> u32 {
        self.size_px
    }

    pub fn module_count(&self) -> usize {
        self.module_count
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Module at `(row, col)`; anything outside the symbol is light
    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        if row >= self.module_count || col >= self.module_count {
            return false;
        }
        self.modules[row * self.module_count + col]
    }

    /// `data:image/png;base64,...`
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            PNG_MIME,
            general_purpose::STANDARD.encode(&self.png)
        )
    }
}

// ============================================================================
// ENCODING
// ============================================================================

pub fn encode(payload: &str, style: &QrStyle) -> Result<QrImage, QrError> {
    if payload.is_empty() {
        return Err(QrError::EmptyPayload);
    }

    let code = QrCode::with_error_correction_level(payload.as_bytes(), style.ec_level)?;
    let module_count = code.width();
    let modules: Vec<bool> = code
        .to_colors()
        .into_iter()
        .map(|c| c == Color::Dark)
        .collect();

    let raster = rasterize(&modules, module_count, style);

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(raster).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    tracing::info!(
        payload_len = payload.len(),
        modules = module_count,
        png_bytes = png.len(),
        "generated QR code"
    );

    Ok(QrImage {
        payload: payload.to_string(),
        png,
        size_px: style.size_px,
        modules,
        module_count,
        generated_at: Utc::now(),
    })
}

/// Scale the module grid into a square image of `style.size_px`.
///
/// The scale is fractional: `size_px / (modules + 2 * margin)`, and each
/// pixel samples the module under it.
fn rasterize(
    modules: &[bool],
    module_count: usize,
    style: &QrStyle,
) -> ImageBuffer<Rgba<u8>, Vec<u8>> {
    let size = style.size_px;
    let total_modules = module_count as f64 + 2.0 * style.margin_modules as f64;
    let scale = size as f64 / total_modules;
    let margin_px = style.margin_modules as f64 * scale;
    let inner_end = size as f64 - margin_px;

    let mut img = ImageBuffer::from_pixel(size, size, Rgba(style.light));

    for y in 0..size {
        let fy = y as f64;
        if fy < margin_px || fy >= inner_end {
            continue;
        }
        let row = (((fy - margin_px) / scale) as usize).min(module_count - 1);

        for x in 0..size {
            let fx = x as f64;
            if fx < margin_px || fx >= inner_end {
                continue;
            }
            let col = (((fx - margin_px) / scale) as usize).min(module_count - 1);

            if modules[row * module_count + col] {
                img.put_pixel(x, y, Rgba(style.dark));
            }
        }
    }

    img
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_is_fixed_square() {
        let qr = encode("Mobile Price: $1,125", &QrStyle::default()).unwrap();
        let decoded = image::load_from_memory(qr.png_bytes()).unwrap().to_rgba8();

        assert_eq!(decoded.width(), 300);
        assert_eq!(decoded.height(), 300);
        assert_eq!(qr.size_px(), 300);
    }

    #[test]
    fn test_margin_is_light_and_finder_is_dark() {
        let style = QrStyle::default();
        let qr = encode("hello", &style).unwrap();
        let decoded = image::load_from_memory(qr.png_bytes()).unwrap().to_rgba8();

        // Version 1 symbol: 21 modules + 2*2 margin = 25, 12px per module
        assert_eq!(qr.module_count(), 21);
        assert_eq!(decoded.get_pixel(0, 0).0, style.light);
        assert_eq!(decoded.get_pixel(23, 23).0, style.light);
        assert_eq!(decoded.get_pixel(24, 24).0, style.dark);
        assert_eq!(decoded.get_pixel(299, 299).0, style.light);
        assert!(qr.is_dark(0, 0));
    }

    #[test]
    fn test_payload_travels_with_image() {
        let qr = encode("custom text", &QrStyle::default()).unwrap();
        assert_eq!(qr.payload(), "custom text");
    }

    #[test]
    fn test_data_uri_prefix() {
        let qr = encode("hello", &QrStyle::default()).unwrap();
        let uri = qr.data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));

        let body = uri.trim_start_matches("data:image/png;base64,");
        let bytes = general_purpose::STANDARD.decode(body).unwrap();
        assert_eq!(bytes, qr.png_bytes());
    }

    #[test]
    fn test_oversized_payload_fails() {
        let payload = "x".repeat(5000);
        let err = encode(&payload, &QrStyle::default()).unwrap_err();
        assert!(matches!(err, QrError::Encode(_)));
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert!(matches!(
            encode("", &QrStyle::default()),
            Err(QrError::EmptyPayload)
        ));
    }

    #[test]
    fn test_out_of_range_module_is_light() {
        let qr = encode("hello", &QrStyle::default()).unwrap();
        assert!(!qr.is_dark(100, 0));
        assert!(!qr.is_dark(0, 100));
    }
}
