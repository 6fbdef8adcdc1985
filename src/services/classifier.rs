//! Filename-based media classification and the extension/MIME tables shared
//! by the catalog, the upload validator and the stream endpoint.

use crate::models::media::MediaCategory;

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a"];
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp"];

/// Extensions accepted by the upload endpoint.
pub const UPLOAD_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "wav", "mp3", "flac", "pdf", "docx"];

/// Declared MIME types accepted by the upload endpoint.
pub const UPLOAD_MIME_TYPES: &[&str] = &[
    // Images
    "image/png",
    "image/jpeg",
    "image/jpg",
    // Audio
    "audio/wav",
    "audio/wave",
    "audio/x-wav",
    "audio/mpeg",
    "audio/mp3",
    "audio/mp4",
    "audio/flac",
    "audio/x-flac",
    // Documents
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Content types served for audio regardless of what the store reports;
/// buckets frequently hold audio tagged as `application/octet-stream`.
const AUDIO_CONTENT_TYPES: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("m4a", "audio/mp4"),
];

/// Lower-cased text after the last `.`, if there is any.
pub fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Map a filename to its coarse category. Total: unknown or missing
/// extensions are `Other`.
pub fn classify(name: &str) -> MediaCategory {
    let Some(ext) = extension(name) else {
        return MediaCategory::Other;
    };
    let ext = ext.as_str();

    if AUDIO_EXTENSIONS.contains(&ext) {
        MediaCategory::Audio
    } else if PDF_EXTENSIONS.contains(&ext) {
        MediaCategory::Pdf
    } else if IMAGE_EXTENSIONS.contains(&ext) {
        MediaCategory::Image
    } else {
        MediaCategory::Other
    }
}

/// Forced content type for `name`, if its extension is in the override table.
pub fn content_type_override(name: &str) -> Option<&'static str> {
    let ext = extension(name)?;
    AUDIO_CONTENT_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, content_type)| *content_type)
}

/// An upload passes when either its extension or its declared MIME type is
/// on the allow-list.
pub fn is_upload_allowed(name: &str, declared_mime: Option<&str>) -> bool {
    let ext_ok = extension(name).is_some_and(|ext| UPLOAD_EXTENSIONS.contains(&ext.as_str()));
    let mime_ok = declared_mime.is_some_and(|mime| {
        UPLOAD_MIME_TYPES
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime.trim()))
    });
    ext_ok || mime_ok
}
