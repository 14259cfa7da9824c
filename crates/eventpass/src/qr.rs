//! QR rendering for registration payloads.
//!
//! The store only produces [`RegisteredEvent::qr_code_data`]; these helpers
//! turn that text into something scannable.
//!
//! [`RegisteredEvent::qr_code_data`]: crate::registration::RegisteredEvent::qr_code_data

use qrcode::render::{svg, unicode};
use qrcode::QrCode;
use tracing::debug;

use crate::error::{Error, Result};

fn encode(payload: &str) -> Result<QrCode> {
    if payload.is_empty() {
        return Err(Error::qr_encode("payload is empty"));
    }
    let code = QrCode::new(payload.as_bytes()).map_err(|e| Error::qr_encode(e.to_string()))?;
    debug!(
        "Encoded {} byte payload into {}x{} modules",
        payload.len(),
        code.width(),
        code.width()
    );
    Ok(code)
}

/// Render `payload` as an SVG document at least `size_px` pixels square.
///
/// # Errors
///
/// Returns [`Error::QrEncode`] if `size_px` is zero, the payload is empty,
/// or it does not fit in a QR code.
pub fn render_svg(payload: &str, size_px: u32) -> Result<String> {
    if size_px == 0 {
        return Err(Error::qr_encode("image size must be greater than 0"));
    }
    let code = encode(payload)?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(size_px, size_px)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

/// Render `payload` with Unicode half blocks for display in a terminal.
///
/// # Errors
///
/// Returns [`Error::QrEncode`] if the payload is empty or does not fit in a
/// QR code.
pub fn render_terminal(payload: &str) -> Result<String> {
    let code = encode(payload)?;
    // Inverted so the code reads correctly on dark terminal backgrounds.
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}
