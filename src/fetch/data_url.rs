//! Base64 `data:` URL helpers

use base64::{engine::general_purpose::STANDARD, Engine};
use crate::error::{AppError, Result};

/// Check whether a locator is an inline `data:` URL
pub fn is_data_url(locator: &str) -> bool {
    locator.starts_with("data:")
}

/// Decode the payload of a base64 `data:` URL, returning the bytes and
/// the declared media type (if any).
pub fn decode(data_url: &str) -> Result<(Vec<u8>, Option<String>)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| AppError::AssetUnavailable("Not a data URL".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AppError::AssetUnavailable("Data URL has no payload".to_string()))?;

    let media_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| AppError::AssetUnavailable("Only base64 data URLs are supported".to_string()))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| AppError::AssetUnavailable(format!("Invalid base64 data: {}", e)))?;

    let media_type = (!media_type.is_empty()).then(|| media_type.to_string());
    Ok((bytes, media_type))
}

/// Wrap an already base64-encoded image payload into a data URL
pub fn wrap_base64(encoded: &str, format: &str) -> String {
    format!("data:image/{};base64,{}", format, encoded)
}

/// Create a data URL from binary image data
pub fn create_data_url(data: &[u8], format: &str) -> String {
    wrap_base64(&STANDARD.encode(data), format)
}
