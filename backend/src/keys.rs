//! Object key derivation
//!
//! Every upload lands at `uploads/<unix millis>-<8 hex>-<sanitized name>`, for
//! both presigned and proxied uploads.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::Utc;
use rand::RngCore;
use regex::Regex;
use validator::ValidationError;

/// Prefix of every generated key
pub const UPLOAD_PREFIX: &str = "uploads/";

/// Filename used when the proxy route receives none
pub const DEFAULT_CLIP_NAME: &str = "clip.mp4";

/// Longest accepted filename, in characters
pub const MAX_FILENAME_CHARS: usize = 255;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9._-]").expect("valid regex"));

/// Replaces every character outside `[a-zA-Z0-9._-]` with `_`
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    UNSAFE_CHARS.replace_all(filename, "_").into_owned()
}

/// Checks a client-supplied filename, ignoring surrounding whitespace
///
/// # Errors
///
/// Returns an error carrying `filename required` when the name is blank and
/// `filename too long` when it exceeds [`MAX_FILENAME_CHARS`].
pub fn validate_filename(filename: &str) -> Result<(), ValidationError> {
    let trimmed = filename.trim();
    if trimmed.is_empty() {
        return Err(
            ValidationError::new("filename").with_message(Cow::Borrowed("filename required"))
        );
    }
    if trimmed.chars().count() > MAX_FILENAME_CHARS {
        return Err(
            ValidationError::new("filename").with_message(Cow::Borrowed("filename too long"))
        );
    }
    Ok(())
}

/// Builds a fresh key for `filename`
///
/// Two calls with the same filename differ by timestamp and 32 random bits.
#[must_use]
pub fn upload_key(filename: &str) -> String {
    let mut suffix = [0u8; 4];
    rand::thread_rng().fill_bytes(&mut suffix);

    format!(
        "{UPLOAD_PREFIX}{}-{}-{}",
        Utc::now().timestamp_millis(),
        hex::encode(suffix),
        sanitize_filename(filename)
    )
}
