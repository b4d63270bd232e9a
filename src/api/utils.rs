//! API utility functions
//!
//! Pure, stateless helpers for response delivery, extracted from the
//! handlers to enable unit testing.

use mime::Mime;

/// Media type for an artifact extension. Unknown extensions fall back to a
/// generic byte stream.
pub fn media_type_for_extension(ext: &str) -> Mime {
    let value = match ext.to_ascii_lowercase().as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "ogg" | "opus" => "audio/ogg",
        _ => return mime::APPLICATION_OCTET_STREAM,
    };

    value.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

/// `attachment` disposition carrying an ASCII fallback plus the RFC 5987
/// UTF-8 form of the filename.
pub fn content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitize_ascii_filename(filename),
        percent_encode(filename)
    )
}

/// ASCII-safe fallback filename for header use.
pub fn sanitize_ascii_filename(value: &str) -> String {
    let mut sanitized = String::with_capacity(value.len());

    for character in value.chars() {
        if character.is_ascii_alphanumeric()
            || matches!(character, '.' | '-' | '_' | ' ' | '(' | ')')
        {
            sanitized.push(character);
        } else {
            sanitized.push('_');
        }
    }

    let compact = sanitized.trim();
    if compact.is_empty() {
        "download.bin".to_string()
    } else {
        compact.to_string()
    }
}

/// RFC 3986 unreserved characters pass through; everything else is
/// percent-encoded byte-wise (sufficient for the `filename*` parameter).
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
