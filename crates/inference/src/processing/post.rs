use super::coco;
use crate::backend::InferenceOutput;
use ndarray::{ArrayViewD, Axis, Ix1, Ix2};
use schema::Detection;

pub struct PostProcessor {
    pub confidence_threshold: f32,
}

impl PostProcessor {
    pub fn new(confidence_threshold: f32) -> Self {
        Self {
            confidence_threshold,
        }
    }

    /// Zip the raw `boxes`/`labels`/`scores` outputs, keep scores strictly
    /// above the threshold and format them for the wire.
    ///
    /// Output order is the model's order. A label outside the COCO table is
    /// an error; `N/A` slots are emitted as-is.
    #[tracing::instrument(skip_all, fields(threshold = self.confidence_threshold))]
    pub fn parse_detections(&self, output: &InferenceOutput) -> anyhow::Result<Vec<Detection>> {
        let boxes = drop_batch_axis(output.boxes.view(), 2)
            .into_dimensionality::<Ix2>()
            .map_err(|e| anyhow::anyhow!("Unexpected boxes shape {:?}: {}", output.boxes.shape(), e))?;
        let labels = drop_batch_axis(output.labels.view(), 1)
            .into_dimensionality::<Ix1>()
            .map_err(|e| anyhow::anyhow!("Unexpected labels shape {:?}: {}", output.labels.shape(), e))?;
        let scores = drop_batch_axis(output.scores.view(), 1)
            .into_dimensionality::<Ix1>()
            .map_err(|e| anyhow::anyhow!("Unexpected scores shape {:?}: {}", output.scores.shape(), e))?;

        if boxes.ncols() != 4 {
            anyhow::bail!("Expected boxes with 4 coordinates, got {}", boxes.ncols());
        }

        let mut detections = Vec::new();

        for ((bbox, &label), &score) in boxes
            .rows()
            .into_iter()
            .zip(labels.iter())
            .zip(scores.iter())
            .filter(|(_, score)| **score > self.confidence_threshold)
        {
            let class_name = coco::class_name(label).ok_or_else(|| {
                anyhow::anyhow!("Class label {} is outside the COCO class table", label)
            })?;

            detections.push(Detection {
                class_name: class_name.to_string(),
                confidence: round_to(f64::from(score), 3),
                bbox: [
                    round_to(f64::from(bbox[0]), 2),
                    round_to(f64::from(bbox[1]), 2),
                    round_to(f64::from(bbox[2]), 2),
                    round_to(f64::from(bbox[3]), 2),
                ],
            });
        }

        tracing::trace!(
            candidates = scores.len(),
            kept = detections.len(),
            "Filtered detections"
        );

        Ok(detections)
    }
}

/// Accept an extra leading batch axis of size 1 on any output.
fn drop_batch_axis<T>(view: ArrayViewD<'_, T>, ndim: usize) -> ArrayViewD<'_, T> {
    if view.ndim() == ndim + 1 && view.shape()[0] == 1 {
        view.index_axis_move(Axis(0), 0)
    } else {
        view
    }
}

/// Exact ties go to the even neighbour: `0.5625` at 3 decimals is `0.562`.
#[inline]
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
