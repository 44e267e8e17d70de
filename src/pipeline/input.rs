//! Input resolution: validate the user-supplied image path.
//!
//! The checks here turn the common mistakes (typo in the path, a directory,
//! an unreadable file) into specific errors before any bytes are read or any
//! request is built.

use crate::error::Img2TextError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve a local image path, checking it exists and is a readable regular file.
pub fn resolve_image(path: impl AsRef<Path>) -> Result<PathBuf, Img2TextError> {
    let path = path.as_ref().to_path_buf();

    let meta = match std::fs::metadata(&path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Img2TextError::PermissionDenied { path });
        }
        Err(_) => return Err(Img2TextError::FileNotFound { path }),
    };

    if !meta.is_file() {
        return Err(Img2TextError::NotAFile { path });
    }

    // Check read permission by attempting to open
    if let Err(e) = std::fs::File::open(&path) {
        return Err(match e.kind() {
            std::io::ErrorKind::PermissionDenied => Img2TextError::PermissionDenied { path },
            _ => Img2TextError::ReadFailed { path, source: e },
        });
    }

    debug!("Resolved local image: {}", path.display());
    Ok(path)
}
