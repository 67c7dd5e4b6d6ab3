//! Multipart upload extraction shared by the HTTP services.
//!
//! Both services accept a single multipart field named `file`. Rejections at
//! this level happen before any image validation and carry their own status.

use axum::extract::Multipart;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use bytes::Bytes;

pub const FILE_FIELD: &str = "file";

/// Raw upload as received: bytes plus the declared filename and content-type.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedImage {
    /// True when the declared content-type has the `image/` media-type prefix.
    /// A missing content-type is not an image.
    pub fn has_image_content_type(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }

    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("<unnamed>")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{detail}")]
pub struct UploadRejection {
    pub status: StatusCode,
    pub detail: String,
}

impl UploadRejection {
    pub fn missing_file() -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: format!("Field '{}' is required", FILE_FIELD),
        }
    }
}

impl From<MultipartRejection> for UploadRejection {
    fn from(rejection: MultipartRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for UploadRejection {
    fn from(err: MultipartError) -> Self {
        Self {
            status: err.status(),
            detail: err.body_text(),
        }
    }
}

/// Pull the `file` field out of a multipart request, skipping any other field.
pub async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadedImage, UploadRejection> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await?;

        return Ok(UploadedImage {
            filename,
            content_type,
            bytes,
        });
    }

    Err(UploadRejection::missing_file())
}
