//! JSON wire types exchanged between the browser, the gateway and the
//! inference service.

use serde::{Deserialize, Serialize};

/// One detected object. `bbox` is `[x1, y1, x2, y2]` in source image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "class")]
    pub class_name: String,
    pub confidence: f64,
    pub bbox: [f64; 4],
}

/// Detections in the model's native output order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub detections: Vec<Detection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

impl HealthResponse {
    pub fn healthy(model_loaded: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            model_loaded,
        }
    }
}

/// Error body returned by both services for every failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detection_serializes_class_key() {
        let response = DetectionResponse {
            detections: vec![Detection {
                class_name: "dog".to_string(),
                confidence: 0.912,
                bbox: [10.5, 20.25, 110.0, 220.75],
            }],
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "detections": [{
                    "class": "dog",
                    "confidence": 0.912,
                    "bbox": [10.5, 20.25, 110.0, 220.75]
                }]
            })
        );
    }

    #[test]
    fn test_empty_response_shape() {
        let value = serde_json::to_value(DetectionResponse::default()).unwrap();
        assert_eq!(value, json!({ "detections": [] }));
    }

    #[test]
    fn test_health_and_error_bodies() {
        assert_eq!(
            serde_json::to_value(HealthResponse::healthy(true)).unwrap(),
            json!({ "status": "healthy", "model_loaded": true })
        );
        assert_eq!(
            serde_json::to_value(ErrorBody::new("Empty file")).unwrap(),
            json!({ "detail": "Empty file" })
        );
    }
}
