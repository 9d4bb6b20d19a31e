//! Image content type detection and file extensions

/// Fallback when neither the response nor the bytes tell us the type
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Detect an image MIME type from binary data using magic bytes
pub fn sniff(data: &[u8]) -> Option<&'static str> {
    if data.len() < 8 {
        return None;
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }

    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("image/gif");
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    if data.starts_with(b"BM") {
        return Some("image/bmp");
    }

    None
}

/// Pick the content type for fetched bytes: a declared `image/*` type wins,
/// otherwise sniff the payload.
pub fn resolve(declared: Option<&str>, data: &[u8]) -> String {
    let declared = declared
        .map(|value| value.split(';').next().unwrap_or(value).trim().to_lowercase())
        .filter(|value| value.starts_with("image/"));

    declared
        .or_else(|| sniff(data).map(str::to_string))
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

/// File extension for a content type
pub fn extension(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        _ => "bin",
    }
}
