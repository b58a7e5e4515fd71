use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::{Result, TriageError};

/// Strips an optional data-URL scheme declaration
/// (`data:image/<fmt>;base64,`) so only the raw payload goes over the wire.
/// Payloads without a prefix pass through untouched.
pub fn strip_data_url_prefix(payload: &str) -> &str {
    if let Some(rest) = payload.strip_prefix("data:") {
        if let Some(idx) = rest.find(";base64,") {
            return &rest[idx + ";base64,".len()..];
        }
    }
    payload
}

/// Checks that a captured payload carries decodable image bytes. Returns the
/// decoded length so callers can log it without holding the bytes.
pub fn validate_image_payload(payload: &str) -> Result<usize> {
    let raw = strip_data_url_prefix(payload).trim();
    if raw.is_empty() {
        return Err(TriageError::EmptyImage);
    }
    let bytes = STANDARD
        .decode(raw)
        .map_err(|e| TriageError::InvalidImage(e.to_string()))?;
    Ok(bytes.len())
}
