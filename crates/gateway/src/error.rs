use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::UploadRejection;
use schema::ErrorBody;
use std::error::Error as StdError;
use std::io;
use thiserror::Error;

/// Every way forwarding an upload can fail. Display strings are the exact
/// `detail` returned to the browser.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error(transparent)]
    Upload(#[from] UploadRejection),

    /// The inference service answered with a non-2xx status.
    #[error("AI service error: {body}")]
    Downstream { status: StatusCode, body: String },

    #[error("Unable to connect to AI service. Please try again later.")]
    Unavailable(#[source] reqwest::Error),

    #[error("Request timed out. Please try again.")]
    Timeout(#[source] reqwest::Error),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl ProxyError {
    /// Classifies a transport failure. Connection errors win over timeouts so
    /// a connect that times out still reads as "unable to connect". A peer
    /// that hangs up or resets mid-exchange is also unavailable.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() {
            ProxyError::Unavailable(err)
        } else if err.is_timeout() {
            ProxyError::Timeout(err)
        } else if connection_dropped(&err) {
            ProxyError::Unavailable(err)
        } else {
            ProxyError::Unexpected(err.to_string())
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Upload(rejection) => rejection.status,
            ProxyError::Downstream { status, .. } => *status,
            ProxyError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for logs and the outcome counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            ProxyError::Upload(_) => "rejected",
            ProxyError::Downstream { .. } => "downstream_error",
            ProxyError::Unavailable(_) => "unavailable",
            ProxyError::Timeout(_) => "timeout",
            ProxyError::Unexpected(_) => "unexpected",
        }
    }
}

fn connection_dropped(err: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(e) = source {
        if let Some(hyper_err) = e.downcast_ref::<hyper::Error>() {
            if hyper_err.is_incomplete_message() || hyper_err.is_closed() || hyper_err.is_canceled()
            {
                return true;
            }
        }
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        source = e.source();
    }
    false
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
