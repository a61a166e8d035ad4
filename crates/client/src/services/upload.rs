//! `/api/uploads` routes: images and videos as multipart forms.

use nongsan_core::dto::UploadedFile;
use reqwest::multipart::{Form, Part};

use crate::api::ApiClient;
use crate::error::ApiError;

pub use nongsan_core::dto::{MAX_VIDEO_BYTES, format_file_size};

#[derive(Debug, Clone, Copy)]
pub struct UploadApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn uploads(&self) -> UploadApi<'_> {
        UploadApi { api: self }
    }
}

/// Whether the file is a JPEG, PNG, GIF or WebP image.
#[must_use]
pub fn is_image_file(file: &UploadedFile) -> bool {
    file.is_image()
}

#[must_use]
pub fn is_video_file(file: &UploadedFile) -> bool {
    file.is_video()
}

/// Whether the file fits the 50 MB video limit.
#[must_use]
pub fn is_valid_video_size(file: &UploadedFile) -> bool {
    file.is_valid_video_size()
}

fn part(file: &UploadedFile) -> Result<Part, ApiError> {
    Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.content_type)
        .map_err(|e| ApiError::unknown(400, format!("Invalid content type: {e}")))
}

impl UploadApi<'_> {
    /// Upload one image; returns its public URL.
    ///
    /// # Errors
    ///
    /// `upload-e-01` when the file is rejected.
    pub async fn image(&self, file: &UploadedFile) -> Result<String, ApiError> {
        let form = Form::new().part("image", part(file)?);
        self.api
            .post(self.api.api_url("/uploads/image"))
            .multipart(form)
            .data()
            .await
    }

    /// Upload several images in one request; returns their URLs in order.
    ///
    /// # Errors
    ///
    /// `upload-e-01` when any file is rejected.
    pub async fn images(&self, files: &[UploadedFile]) -> Result<Vec<String>, ApiError> {
        let mut form = Form::new();
        for file in files {
            form = form.part("images", part(file)?);
        }
        self.api
            .post(self.api.api_url("/uploads/images"))
            .multipart(form)
            .data()
            .await
    }

    /// # Errors
    ///
    /// `upload-e-01` when the file is rejected.
    pub async fn video(&self, file: &UploadedFile) -> Result<String, ApiError> {
        let form = Form::new().part("video", part(file)?);
        self.api
            .post(self.api.api_url("/uploads/video"))
            .multipart(form)
            .data()
            .await
    }

    /// Delete a previously uploaded file by its URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unknown.
    pub async fn delete(&self, file_url: &str) -> Result<String, ApiError> {
        self.api
            .delete(self.api.api_url("/uploads"))
            .query("file_url", file_url)
            .data()
            .await
    }
}
