//! Uploaded media records.

use serde::{Deserialize, Serialize};

use crate::types::ImageId;

/// Largest video the backend accepts, 50 MiB.
pub const MAX_VIDEO_BYTES: u64 = 50 * 1024 * 1024;

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"];
const VIDEO_TYPES: &[&str] = &["video/mp4", "video/avi", "video/mov", "video/wmv", "video/flv"];

/// Product image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponse {
    pub id: Option<ImageId>,
    pub path: String,
}

/// A local file about to be sent as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    /// MIME type, e.g. `image/png`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        is_image_type(&self.content_type)
    }

    #[must_use]
    pub fn is_video(&self) -> bool {
        is_video_type(&self.content_type)
    }

    /// Whether the file fits under [`MAX_VIDEO_BYTES`].
    #[must_use]
    pub fn is_valid_video_size(&self) -> bool {
        self.size() <= MAX_VIDEO_BYTES
    }
}

/// Whether `content_type` is one of the accepted image types.
#[must_use]
pub fn is_image_type(content_type: &str) -> bool {
    IMAGE_TYPES.contains(&content_type)
}

/// Whether `content_type` is one of the accepted video types.
#[must_use]
pub fn is_video_type(content_type: &str) -> bool {
    VIDEO_TYPES.contains(&content_type)
}

/// Human-readable size with binary units, e.g. `1.5 KB`.
///
/// ```
/// use nongsan_core::dto::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS.get(unit).copied().unwrap_or("GB"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_file_size(1_288_490_189), "1.2 GB");
    }

    #[test]
    fn test_media_type_checks() {
        let photo = UploadedFile::new("cam.webp", "image/webp", vec![0; 10]);
        assert!(photo.is_image());
        assert!(!photo.is_video());

        let clip = UploadedFile::new("farm.mov", "video/mov", Vec::new());
        assert!(clip.is_video());
        assert!(clip.is_valid_video_size());
        assert!(!is_image_type("image/svg+xml"));
    }
}
