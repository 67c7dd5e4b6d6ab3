use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};

#[derive(Clone)]
pub struct ProxyMetrics {
    upstream_duration: Histogram<f64>,
    requests: Counter<u64>,
}

impl ProxyMetrics {
    pub fn init(meter_name: &'static str) -> Self {
        let meter = global::meter(meter_name);
        let upstream_duration = meter
            .f64_histogram("upstream_duration_seconds")
            .with_description("Round trip to the inference service's /detect")
            .with_unit("s")
            .with_boundaries(vec![
                0.025, 0.05, 0.1, 0.2, 0.3, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 5.0, 10.0, 30.0,
            ])
            .build();
        let requests = meter
            .u64_counter("upload_requests_total")
            .with_description("Uploads forwarded, by outcome")
            .build();

        Self {
            upstream_duration,
            requests,
        }
    }

    pub fn record(&self, elapsed_secs: f64, outcome: &'static str) {
        self.upstream_duration.record(elapsed_secs, &[]);
        self.requests.add(1, &[KeyValue::new("outcome", outcome)]);
    }
}
