use crate::config::InferenceConfig;
use common::TelemetryGuard;

pub fn setup_logging(config: &InferenceConfig) -> anyhow::Result<Option<TelemetryGuard>> {
    common::init_observability(
        "inference",
        config.otel_endpoint.as_deref(),
        config.log_level,
        config.environment,
    )
}
