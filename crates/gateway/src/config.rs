use common::{Environment, LogLevel};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub log_level: LogLevel,
    pub environment: Environment,
    pub bind_address: SocketAddr,
    /// Base URL of the inference service; `/detect` is appended.
    pub inference_url: String,
    pub request_timeout_ms: u64,
    pub max_upload_bytes: usize,
    pub otel_endpoint: Option<String>,
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

pub fn get_configuration() -> Result<GatewayConfig, config::ConfigError> {
    build_configuration(None)
}

/// Builds the configuration from `GATEWAY_*` variables, or from `source`
/// in place of the process environment when given.
pub fn build_configuration(
    source: Option<config::Map<String, String>>,
) -> Result<GatewayConfig, config::ConfigError> {
    let config = config::Config::builder()
        .set_default("log_level", "info")?
        .set_default("environment", "development")?
        .set_default("bind_address", "0.0.0.0:8000")?
        .set_default("inference_url", "http://ai-backend:8001")?
        .set_default("request_timeout_ms", 30_000_i64)?
        .set_default("max_upload_bytes", 16_i64 * 1024 * 1024)?
        .add_source(
            config::Environment::with_prefix("GATEWAY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(source),
        )
        .build()?;

    let config: GatewayConfig = config.try_deserialize::<GatewayConfig>()?;

    Ok(config)
}
