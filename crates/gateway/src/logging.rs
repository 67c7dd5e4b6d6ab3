use crate::config::GatewayConfig;
use common::TelemetryGuard;

pub fn setup_logging(config: &GatewayConfig) -> anyhow::Result<Option<TelemetryGuard>> {
    common::init_observability(
        "gateway",
        config.otel_endpoint.as_deref(),
        config.log_level,
        config.environment,
    )
}
