//! Image encoding for vision OCR: `DynamicImage` → base64 PNG `ImageData`.
//!
//! Scans arrive as PNG or JPEG; both are re-encoded as PNG so the request
//! carries a lossless image whatever the source compression was.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Longest edge sent to the vision model. Larger scans are downscaled.
pub const MAX_EDGE_PX: u32 = 2000;

/// Encode a scan as a base64 PNG with `detail: "high"`.
///
/// `detail: "high"` lets tiling vision models see fine print instead of a
/// single low-resolution overview tile.
pub fn encode_scan(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let img = if img.width().max(img.height()) > MAX_EDGE_PX {
        img.resize(MAX_EDGE_PX, MAX_EDGE_PX, image::imageops::FilterType::Lanczos3)
    } else {
        img.clone()
    };

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Encoded {}x{} scan → {} bytes base64",
        img.width(),
        img.height(),
        b64.len()
    );

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}
