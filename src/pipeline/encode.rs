//! Image encoding: file bytes → base64 data URL.
//!
//! Chat-completion APIs accept images inline as `data:<mime>;base64,<payload>`
//! inside an `image_url` content part. The bytes are sent as-is; nothing is
//! decoded or re-compressed, so the MIME type only tells the model how to
//! interpret them. A wrong guess does not break encoding.

use crate::error::Img2TextError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// MIME type used when the extension is missing or unknown.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Extension → MIME type. Keys are lower-case.
const MIME_TABLE: &[(&str, &str)] = &[
    ("avif", "image/avif"),
    ("bmp", "image/bmp"),
    ("gif", "image/gif"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("ico", "image/vnd.microsoft.icon"),
    ("jpe", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("txt", "text/plain"),
    ("webp", "image/webp"),
];

/// Guess a MIME type from the file extension alone.
///
/// The lookup is case-insensitive. The file contents are never inspected.
pub fn guess_mime_type(path: impl AsRef<Path>) -> &'static str {
    let Some(ext) = path.as_ref().extension().and_then(|e| e.to_str()) else {
        return FALLBACK_MIME_TYPE;
    };
    let ext = ext.to_ascii_lowercase();
    MIME_TABLE
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_MIME_TYPE)
}

/// An image embedded inline as a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    /// Standard (padded) base64 of the raw bytes.
    pub payload: String,
}

impl DataUrl {
    /// Base64-encode `bytes` under the given MIME type.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            payload: STANDARD.encode(bytes),
        }
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.payload)
    }
}

/// Read the image at `path` and encode it as a data URL.
///
/// Returns the data URL together with the raw byte count. The file is read in
/// one go and its handle is closed before this function returns.
pub async fn encode_image(path: &Path) -> Result<(DataUrl, usize), Img2TextError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Img2TextError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => Img2TextError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Img2TextError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let mime_type = guess_mime_type(path);
    let data_url = DataUrl::from_bytes(&bytes, mime_type);
    debug!(
        "Encoded {} ({} bytes, {}) → {} bytes base64",
        path.display(),
        bytes.len(),
        mime_type,
        data_url.payload.len()
    );

    Ok((data_url, bytes.len()))
}
