//! Raster dimension sniffing from file headers.
//!
//! Only PNG and GIF headers are read. Every other format, JPEG included,
//! reports unknown dimensions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const GIF_SIGNATURE: &[u8] = b"GIF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Read pixel dimensions from a PNG or GIF header.
///
/// Returns `None` for unsupported signatures and truncated buffers.
pub fn get_image_dimensions(bytes: &[u8]) -> Option<ImageDimensions> {
    if bytes.starts_with(&PNG_SIGNATURE) {
        // IHDR is always the first chunk: width at 16, height at 20
        let width = u32::from_be_bytes(bytes.get(16..20)?.try_into().ok()?);
        let height = u32::from_be_bytes(bytes.get(20..24)?.try_into().ok()?);
        return Some(ImageDimensions { width, height });
    }

    if bytes.starts_with(GIF_SIGNATURE) {
        let width = u16::from_le_bytes(bytes.get(6..8)?.try_into().ok()?);
        let height = u16::from_le_bytes(bytes.get(8..10)?.try_into().ok()?);
        return Some(ImageDimensions {
            width: u32::from(width),
            height: u32::from(height),
        });
    }

    None
}
