use super::{InferenceBackend, InferenceOutput};
use crate::config::{ExecutionProvider, InferenceConfig};
use ndarray::Array3;
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};
use std::sync::Mutex;

/// ONNX Runtime backend for torchvision-style detectors exported with a single
/// `[3, H, W]` image input and `boxes`/`labels`/`scores` outputs.
pub struct OrtBackend {
    // `Session::run` needs exclusive access; forward passes are serialized.
    session: Mutex<Session>,
    input_name: String,
}

impl OrtBackend {
    /// Load model with specified execution provider
    pub fn load_model_with_provider(
        path: &str,
        provider: ExecutionProvider,
        intra_threads: usize,
        input_name: &str,
    ) -> anyhow::Result<Self> {
        // Initialize ORT environment (idempotent)
        let _ = ort::init().commit();

        #[allow(unused_mut)]
        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?;

        match provider {
            #[cfg(feature = "cuda")]
            ExecutionProvider::Cuda => {
                tracing::info!("Initializing ONNX Runtime with CUDA execution provider");
                builder = builder.with_execution_providers([
                    ort::execution_providers::CUDAExecutionProvider::default()
                        .with_device_id(0)
                        .build()
                        .error_on_failure(),
                ])?;
            }
            #[cfg(not(feature = "cuda"))]
            ExecutionProvider::Cuda => {
                tracing::warn!(
                    "CUDA requested but the `cuda` feature is disabled, falling back to CPU"
                );
            }
            ExecutionProvider::Cpu => {
                tracing::info!("Initializing ONNX Runtime with CPU execution provider");
            }
        }

        let session = builder.commit_from_file(path)?;

        tracing::info!("Model loaded from {}", path);
        Ok(Self {
            session: Mutex::new(session),
            input_name: input_name.to_string(),
        })
    }
}

impl InferenceBackend for OrtBackend {
    fn load_model(config: &InferenceConfig) -> anyhow::Result<Self> {
        Self::load_model_with_provider(
            &config.model_path,
            config.execution_provider,
            config.intra_threads,
            &config.input_name,
        )
    }

    fn infer(&self, image: &Array3<f32>) -> anyhow::Result<InferenceOutput> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("ONNX Runtime session mutex poisoned"))?;

        let outputs = session.run(ort::inputs![
            self.input_name.as_str() => TensorRef::from_array_view(image.view().into_dyn())?
        ])?;

        let boxes = outputs["boxes"].try_extract_array::<f32>()?;
        let labels = outputs["labels"].try_extract_array::<i64>()?;
        let scores = outputs["scores"].try_extract_array::<f32>()?;

        Ok(InferenceOutput {
            boxes: boxes.into_owned(),
            labels: labels.into_owned(),
            scores: scores.into_owned(),
        })
    }
}
