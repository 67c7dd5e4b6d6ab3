use crate::config::InferenceConfig;
use ndarray::{Array3, ArrayD};

#[cfg(feature = "ort-backend")]
pub mod ort;

/// A loaded detection model. Implementations are shared read-only across
/// requests, so `infer` takes `&self`.
pub trait InferenceBackend: Send + Sync {
    fn load_model(config: &InferenceConfig) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Run a forward pass on one channel-first `[3, H, W]` image tensor.
    fn infer(&self, image: &Array3<f32>) -> anyhow::Result<InferenceOutput>;
}

pub struct InferenceOutput {
    pub boxes: ArrayD<f32>,  // [N, 4] x1y1x2y2 in input pixel coordinates
    pub labels: ArrayD<i64>, // [N] COCO category ids (1-indexed, 0 = background)
    pub scores: ArrayD<f32>, // [N] sorted by the model, not by us
}
