//! Upload rules shared by the browser-side uploader and the upload endpoint.

use thiserror::Error;

use crate::MediaType;

/// Largest accepted upload (50 MiB). A file of exactly this size is accepted.
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Extension of every stored image: images are re-encoded before storage.
pub const TRANSCODED_IMAGE_EXTENSION: &str = "webp";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FolderError {
    #[error("No folder provided")]
    Missing,
    #[error("Invalid folder name")]
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreflightError {
    #[error("File type not allowed: {0}")]
    UnsupportedType(String),
    #[error("File too large: {size} bytes")]
    TooLarge { size: u64 },
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Accept folders matching `[a-zA-Z0-9_\-/]+`.
///
/// Dots, spaces, backslashes and anything non-ASCII are rejected, which rules
/// out `..` traversal.
pub fn validate_folder(folder: &str) -> Result<(), FolderError> {
    if folder.is_empty() {
        return Err(FolderError::Missing);
    }
    if folder.chars().all(|c| is_name_char(c) || c == '/') {
        Ok(())
    } else {
        Err(FolderError::Invalid)
    }
}

/// Check a candidate file against the allowed types and the size cap.
pub fn preflight(content_type: &str, size: u64) -> Result<MediaType, PreflightError> {
    let media_type = MediaType::from_mime(content_type)
        .ok_or_else(|| PreflightError::UnsupportedType(content_type.to_string()))?;
    if size > MAX_UPLOAD_BYTES {
        return Err(PreflightError::TooLarge { size });
    }
    Ok(media_type)
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if is_name_char(c) { c } else { '_' })
        .collect()
}

/// Base name for a stored object: the filename up to its first `.`, with
/// every character outside `[a-zA-Z0-9_-]` replaced by `_`.
pub fn sanitize_base_name(filename: &str) -> String {
    let stem = filename.split('.').next().unwrap_or_default();
    sanitize(stem)
}

/// Extension after the last `.` of a filename, if it has one.
fn filename_extension(filename: &str) -> Option<&str> {
    let (_, ext) = filename.rsplit_once('.')?;
    (!ext.is_empty()).then_some(ext)
}

fn media_dir(media_type: MediaType) -> &'static str {
    if media_type.is_video() {
        "videos"
    } else {
        "images"
    }
}

/// Storage path for a file uploaded through the server.
///
/// Videos keep their type's subtype as extension; images are transcoded, so
/// they always end in `.webp`.
pub fn object_path(
    folder: &str,
    filename: &str,
    media_type: MediaType,
    timestamp_ms: i64,
) -> String {
    let ext = if media_type.is_video() {
        media_type.subtype()
    } else {
        TRANSCODED_IMAGE_EXTENSION
    };
    format!(
        "{folder}/{}/{}-{timestamp_ms}.{ext}",
        media_dir(media_type),
        sanitize_base_name(filename)
    )
}

/// Storage path for a file the browser uploads directly with a signed URL.
///
/// No transcoding happens on this path, so the filename's own extension is
/// kept (sanitized), falling back to the type's subtype.
pub fn direct_object_path(
    folder: &str,
    filename: &str,
    media_type: MediaType,
    timestamp_ms: i64,
) -> String {
    let ext = filename_extension(filename)
        .map(sanitize)
        .unwrap_or_else(|| media_type.subtype().to_string());
    format!(
        "{folder}/{}/{}-{timestamp_ms}.{ext}",
        media_dir(media_type),
        sanitize_base_name(filename)
    )
}

/// Whole-number transfer progress, `round(sent / total * 100)`, capped at 100.
pub fn progress_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let sent = sent.min(total) as u128;
    let total = total as u128;
    ((sent * 100 + total / 2) / total) as u8
}
