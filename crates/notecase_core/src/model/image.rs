//! Image payload helpers.
//!
//! # Responsibility
//! - Turn raw image bytes into the text-encoded `data:` URL stored on notes.
//! - Inspect stored payloads without decoding them.
//!
//! # Invariants
//! - Only `image/*` mime types are encoded.
//! - Remote URLs are stored verbatim and never fetched.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

static DATA_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:(image/[A-Za-z0-9.+-]+);base64,[A-Za-z0-9+/=]+$")
        .expect("valid data url regex")
});

/// Error for image payload encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// The mime type is not an `image/*` type.
    UnsupportedMime(String),
    /// No bytes were supplied.
    EmptyPayload,
}

impl Display for ImageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedMime(mime) => write!(f, "unsupported image mime type `{mime}`"),
            Self::EmptyPayload => write!(f, "image payload is empty"),
        }
    }
}

impl Error for ImageError {}

/// Encodes image bytes as a base64 `data:` URL.
pub fn encode_image_data_url(mime: &str, bytes: &[u8]) -> Result<String, ImageError> {
    let mime = mime.trim().to_ascii_lowercase();
    if !mime.starts_with("image/") || mime.len() == "image/".len() {
        return Err(ImageError::UnsupportedMime(mime));
    }
    if bytes.is_empty() {
        return Err(ImageError::EmptyPayload);
    }
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

/// Returns the mime type of a `data:` URL payload.
///
/// Returns `None` for remote URLs and malformed payloads.
pub fn image_mime_type(payload: &str) -> Option<&str> {
    DATA_URL_RE
        .captures(payload)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Guesses an image mime type from a file extension.
pub fn guess_image_mime(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}
