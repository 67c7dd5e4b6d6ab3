use crate::error::ProxyError;
use axum::body::Bytes;
use common::{UploadedImage, upload::FILE_FIELD};
use reqwest::multipart::{Form, Part};
use serde::de::IgnoredAny;
use std::time::Duration;

/// HTTP client for the inference service's `/detect` endpoint.
#[derive(Clone)]
pub struct InferenceClient {
    client: reqwest::Client,
    detect_url: String,
}

impl InferenceClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            detect_url: format!("{}/detect", base_url.trim_end_matches('/')),
        })
    }

    pub fn detect_url(&self) -> &str {
        &self.detect_url
    }

    /// Forwards the upload as multipart field `file`, keeping its filename and
    /// content type. A 2xx body must be JSON and is returned byte for byte;
    /// any other status becomes [`ProxyError::Downstream`].
    pub async fn detect(&self, upload: UploadedImage) -> Result<Bytes, ProxyError> {
        let mut part = Part::bytes(upload.bytes.to_vec());
        if let Some(filename) = upload.filename {
            part = part.file_name(filename);
        }
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| ProxyError::Unexpected(e.to_string()))?;
        }
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .client
            .post(&self.detect_url)
            .multipart(form)
            .send()
            .await
            .map_err(ProxyError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(ProxyError::from_transport)?;
            return Err(ProxyError::Downstream { status, body });
        }

        let body = response.bytes().await.map_err(ProxyError::from_transport)?;
        serde_json::from_slice::<IgnoredAny>(&body)
            .map_err(|e| ProxyError::Unexpected(e.to_string()))?;

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_url_joins_base() {
        let client = InferenceClient::new("http://ai-backend:8001/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.detect_url(), "http://ai-backend:8001/detect");

        let client = InferenceClient::new("http://localhost:8001", Duration::from_secs(1)).unwrap();
        assert_eq!(client.detect_url(), "http://localhost:8001/detect");
    }
}
