use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::UploadRejection;
use schema::ErrorBody;
use thiserror::Error;

/// Error taxonomy surfaced by `/detect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UploadRejected,
    InvalidInput,
    ProcessingError,
    InferenceError,
    InternalError,
}

impl ErrorKind {
    /// Label used on the failure counter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UploadRejected => "upload_rejected",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::ProcessingError => "processing_error",
            ErrorKind::InferenceError => "inference_error",
            ErrorKind::InternalError => "internal_error",
        }
    }
}

/// Every way a detection request can fail. Display strings are the exact
/// `detail` returned to callers; underlying causes stay in `source()` and only
/// reach the logs.
#[derive(Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Upload(#[from] UploadRejection),

    #[error("File must be an image")]
    NotAnImage,

    #[error("Empty file")]
    EmptyFile,

    #[error("Invalid image format")]
    InvalidImageFormat(#[source] image::ImageError),

    #[error("Failed to process image")]
    Processing(#[source] anyhow::Error),

    #[error("Model inference failed")]
    Inference(#[source] anyhow::Error),

    #[error("{0}")]
    Internal(String),
}

impl DetectError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DetectError::Upload(_) => ErrorKind::UploadRejected,
            DetectError::NotAnImage | DetectError::EmptyFile | DetectError::InvalidImageFormat(_) => {
                ErrorKind::InvalidInput
            }
            DetectError::Processing(_) => ErrorKind::ProcessingError,
            DetectError::Inference(_) => ErrorKind::InferenceError,
            DetectError::Internal(_) => ErrorKind::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            DetectError::Upload(rejection) => rejection.status,
            DetectError::NotAnImage
            | DetectError::EmptyFile
            | DetectError::InvalidImageFormat(_)
            | DetectError::Processing(_) => StatusCode::BAD_REQUEST,
            DetectError::Inference(_) | DetectError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Pipeline stage the request died in, for logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            DetectError::Upload(_) => "upload",
            DetectError::NotAnImage | DetectError::EmptyFile => "validate",
            DetectError::InvalidImageFormat(_) => "decode",
            DetectError::Processing(_) => "preprocess",
            DetectError::Inference(_) => "inference",
            DetectError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for DetectError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
