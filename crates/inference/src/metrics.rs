use crate::error::ErrorKind;
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};

/// Request-level instruments. Recording is a no-op until a meter provider is
/// installed (see `common::TelemetryGuard`).
#[derive(Clone)]
pub struct DetectMetrics {
    duration: Histogram<f64>,
    requests: Counter<u64>,
    failures: Counter<u64>,
    detections: Counter<u64>,
}

impl DetectMetrics {
    pub fn init(meter_name: &'static str) -> Self {
        let meter = global::meter(meter_name);
        let latency_buckets = [
            0.01, 0.025, 0.05, 0.075, 0.1, 0.15, 0.2, 0.3, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 5.0,
            10.0,
        ];
        let duration = meter
            .f64_histogram("detect_duration_seconds")
            .with_description("Time to handle one upload (decode + preprocess + infer + postprocess)")
            .with_unit("s")
            .with_boundaries(latency_buckets.to_vec())
            .build();
        let requests = meter
            .u64_counter("detect_requests_total")
            .with_description("Total detection requests handled")
            .build();
        let failures = meter
            .u64_counter("detect_failures_total")
            .with_description("Detection requests that failed, by error kind and stage")
            .build();
        let detections = meter
            .u64_counter("detect_objects_total")
            .with_description("Total detections returned after filtering")
            .build();

        Self {
            duration,
            requests,
            failures,
            detections,
        }
    }

    pub fn record_success(&self, elapsed_secs: f64, detections: usize) {
        self.duration.record(elapsed_secs, &[]);
        self.requests.add(1, &[KeyValue::new("outcome", "success")]);
        self.detections.add(detections as u64, &[]);
    }

    pub fn record_failure(&self, elapsed_secs: f64, kind: ErrorKind, stage: &'static str) {
        self.duration.record(elapsed_secs, &[]);
        self.requests.add(1, &[KeyValue::new("outcome", "failure")]);
        self.failures.add(
            1,
            &[
                KeyValue::new("kind", kind.as_str()),
                KeyValue::new("stage", stage),
            ],
        );
    }
}
