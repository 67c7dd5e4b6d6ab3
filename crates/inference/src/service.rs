use crate::{
    backend::InferenceBackend,
    config::InferenceConfig,
    error::DetectError,
    metrics::DetectMetrics,
    processing::{
        post::PostProcessor,
        pre::{PreProcessor, decode_image},
    },
};
use common::UploadedImage;
use schema::DetectionResponse;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Validates uploads and runs them through decode, tensor conversion,
/// inference and post-processing.
///
/// The backend is loaded once at startup and never mutated afterwards; `None`
/// means loading failed and every request fails at the inference stage.
#[derive(Clone)]
pub struct DetectionService {
    backend: Option<Arc<dyn InferenceBackend>>,
    preprocessor: PreProcessor,
    postprocessor: Arc<PostProcessor>,
    metrics: DetectMetrics,
}

impl DetectionService {
    pub fn new(backend: Option<Arc<dyn InferenceBackend>>, config: &InferenceConfig) -> Self {
        Self {
            backend,
            preprocessor: PreProcessor::new(config.max_image_pixels),
            postprocessor: Arc::new(PostProcessor::new(config.confidence_threshold)),
            metrics: DetectMetrics::init("inference"),
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn detect(&self, upload: UploadedImage) -> Result<DetectionResponse, DetectError> {
        let filename = upload.display_name().to_string();
        let span = tracing::info_span!("detect", filename = %filename);

        async move {
            tracing::info!(filename = %filename, "Processing file");

            let start = Instant::now();
            let result = self.run_pipeline(upload).await;
            let elapsed = start.elapsed().as_secs_f64();

            match &result {
                Ok(response) => {
                    let found = response.detections.len();
                    self.metrics.record_success(elapsed, found);
                    tracing::info!(
                        filename = %filename,
                        objects = found,
                        elapsed_ms = elapsed * 1000.0,
                        "Successfully processed image. Found {} objects.",
                        found
                    );
                }
                Err(err) => {
                    self.metrics.record_failure(elapsed, err.kind(), err.stage());
                    log_failure(&filename, err);
                }
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn run_pipeline(&self, upload: UploadedImage) -> Result<DetectionResponse, DetectError> {
        if !upload.has_image_content_type() {
            return Err(DetectError::NotAnImage);
        }

        if upload.bytes.is_empty() {
            return Err(DetectError::EmptyFile);
        }

        // Decoding and the forward pass are CPU-bound; keep them off the
        // async workers.
        let service = self.clone();
        let span = tracing::Span::current();
        tokio::task::spawn_blocking(move || {
            let _enter = span.enter();
            service.process(&upload.bytes)
        })
        .await
        .map_err(|e| DetectError::Internal(e.to_string()))?
    }

    fn process(&self, bytes: &[u8]) -> Result<DetectionResponse, DetectError> {
        let image = decode_image(bytes).map_err(DetectError::InvalidImageFormat)?;

        tracing::debug!(
            width = image.width(),
            height = image.height(),
            color = ?image.color(),
            "Decoded image"
        );

        let tensor = self
            .preprocessor
            .to_tensor(&image)
            .map_err(DetectError::Processing)?;
        drop(image);

        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| DetectError::Inference(anyhow::anyhow!("Model is not loaded")))?;

        let output = {
            let _infer_span = tracing::info_span!("model_inference").entered();
            backend.infer(&tensor).map_err(DetectError::Inference)?
        };

        let detections = self
            .postprocessor
            .parse_detections(&output)
            .map_err(|e| DetectError::Internal(e.to_string()))?;

        Ok(DetectionResponse { detections })
    }
}

fn log_failure(filename: &str, err: &DetectError) {
    let cause = std::error::Error::source(err).map(|source| source.to_string());

    if err.status().is_server_error() {
        tracing::error!(
            filename,
            kind = err.kind().as_str(),
            stage = err.stage(),
            status = err.status().as_u16(),
            cause = ?cause,
            "{}",
            err
        );
    } else {
        tracing::warn!(
            filename,
            kind = err.kind().as_str(),
            stage = err.stage(),
            status = err.status().as_u16(),
            cause = ?cause,
            "{}",
            err
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InferenceOutput;
    use crate::error::ErrorKind;
    use axum::body::Bytes;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use ndarray::{Array, Array3, IxDyn};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend returning a fixed output and counting forward passes
    struct FixedBackend {
        rows: Vec<([f32; 4], i64, f32)>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl FixedBackend {
        fn new(rows: Vec<([f32; 4], i64, f32)>) -> Self {
            Self {
                rows,
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                rows: Vec::new(),
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    impl InferenceBackend for FixedBackend {
        fn load_model(_config: &InferenceConfig) -> anyhow::Result<Self> {
            Ok(Self::new(Vec::new()))
        }

        fn infer(&self, image: &Array3<f32>) -> anyhow::Result<InferenceOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(image.shape()[0], 3, "Backend should receive CHW input");

            if self.fail {
                anyhow::bail!("forward pass exploded");
            }

            let n = self.rows.len();
            let boxes = self.rows.iter().flat_map(|r| r.0).collect();
            let labels = self.rows.iter().map(|r| r.1).collect();
            let scores = self.rows.iter().map(|r| r.2).collect();

            Ok(InferenceOutput {
                boxes: Array::from_shape_vec(IxDyn(&[n, 4]), boxes)?,
                labels: Array::from_shape_vec(IxDyn(&[n]), labels)?,
                scores: Array::from_shape_vec(IxDyn(&[n]), scores)?,
            })
        }
    }

    fn png_bytes() -> Bytes {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 12, Rgb([90, 120, 200])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        Bytes::from(buf.into_inner())
    }

    fn upload(content_type: Option<&str>, bytes: Bytes) -> UploadedImage {
        UploadedImage {
            filename: Some("test.png".to_string()),
            content_type: content_type.map(str::to_string),
            bytes,
        }
    }

    fn service_with(backend: Option<Arc<dyn InferenceBackend>>) -> DetectionService {
        DetectionService::new(backend, &InferenceConfig::test_default())
    }

    #[tokio::test]
    async fn test_content_type_checked_before_anything_else() {
        let backend = Arc::new(FixedBackend::new(Vec::new()));
        let service = service_with(Some(backend.clone()));

        // Empty body and non-image type: the type check wins
        let err = service
            .detect(upload(Some("text/plain"), Bytes::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, DetectError::NotAnImage));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_content_type_rejected() {
        let service = service_with(Some(Arc::new(FixedBackend::new(Vec::new()))));

        let err = service.detect(upload(None, png_bytes())).await.unwrap_err();
        assert!(matches!(err, DetectError::NotAnImage));
    }

    #[tokio::test]
    async fn test_empty_then_invalid_format() {
        let service = service_with(Some(Arc::new(FixedBackend::new(Vec::new()))));

        let err = service
            .detect(upload(Some("image/png"), Bytes::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, DetectError::EmptyFile));

        let err = service
            .detect(upload(Some("image/jpeg"), Bytes::from_static(b"not an image")))
            .await
            .unwrap_err();
        assert!(matches!(err, DetectError::InvalidImageFormat(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_successful_detection() {
        let backend = Arc::new(FixedBackend::new(vec![
            ([1.234, 2.345, 10.0, 11.111], 18, 0.91234),
            ([0.0, 0.0, 5.0, 5.0], 1, 0.3),
        ]));
        let service = service_with(Some(backend.clone()));

        let response = service
            .detect(upload(Some("image/png"), png_bytes()))
            .await
            .unwrap();

        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.detections.len(), 1);
        assert_eq!(response.detections[0].class_name, "dog");
        assert_eq!(response.detections[0].confidence, 0.912);
    }

    #[tokio::test]
    async fn test_backend_failure_is_inference_error() {
        let service = service_with(Some(Arc::new(FixedBackend::failing())));

        let err = service
            .detect(upload(Some("image/png"), png_bytes()))
            .await
            .unwrap_err();

        assert!(matches!(err, DetectError::Inference(_)));
        assert_eq!(err.to_string(), "Model inference failed");
    }

    #[tokio::test]
    async fn test_unloaded_model_fails_at_inference_stage() {
        let service = service_with(None);
        assert!(!service.model_loaded());

        // Validation still runs first
        let err = service
            .detect(upload(Some("image/png"), Bytes::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, DetectError::EmptyFile));

        let err = service
            .detect(upload(Some("image/png"), png_bytes()))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "inference");
    }

    #[tokio::test]
    async fn test_out_of_table_label_is_internal_error() {
        let service = service_with(Some(Arc::new(FixedBackend::new(vec![(
            [0.0, 0.0, 1.0, 1.0],
            91,
            0.99,
        )]))));

        let err = service
            .detect(upload(Some("image/png"), png_bytes()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InternalError);
        assert!(err.to_string().contains("91"));
    }
}
