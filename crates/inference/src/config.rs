use std::env;
use std::net::SocketAddr;

pub use common::{Environment, LogLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionProvider {
    Cpu,
    Cuda,
}

impl ExecutionProvider {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.to_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda),
            other => anyhow::bail!(
                "{} is not a supported execution provider. Use either `cpu` or `cuda`.",
                other
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub environment: Environment,
    pub log_level: LogLevel,
    pub bind_address: SocketAddr,
    pub model_path: String,
    pub execution_provider: ExecutionProvider,
    pub intra_threads: usize,
    pub input_name: String,
    pub confidence_threshold: f32,
    pub max_upload_bytes: usize,
    pub max_image_pixels: u64,
    pub otel_endpoint: Option<String>,
}

impl InferenceConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unparseable numeric values fall back to their defaults; an unparseable
    /// bind address or execution provider is an error.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .map(|v| Environment::parse_lenient(&v))
            .unwrap_or(Environment::Development);

        let log_level = lookup("LOG_LEVEL")
            .map(|v| LogLevel::parse_lenient(&v))
            .unwrap_or(LogLevel::Info);

        let bind_address = lookup("BIND_ADDRESS")
            .unwrap_or_else(|| "0.0.0.0:8001".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid BIND_ADDRESS: {}", e))?;

        let model_path = lookup("MODEL_PATH").unwrap_or_else(|| {
            "models/fasterrcnn_mobilenet_v3_large_320_fpn.onnx".to_string()
        });

        let execution_provider = lookup("EXECUTION_PROVIDER")
            .map(|v| ExecutionProvider::parse(&v))
            .transpose()?
            .unwrap_or(ExecutionProvider::Cpu);

        let intra_threads = lookup("INTRA_THREADS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(4);

        let input_name = lookup("INPUT_NAME").unwrap_or_else(|| "images".to_string());

        let confidence_threshold = lookup("CONFIDENCE_THRESHOLD")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.5);

        let max_upload_bytes = lookup("MAX_UPLOAD_BYTES")
            .and_then(|s| s.parse().ok())
            .unwrap_or(16 * 1024 * 1024);

        let max_image_pixels = lookup("MAX_IMAGE_PIXELS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(40_000_000);

        let otel_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|s| !s.is_empty());

        Ok(Self {
            environment,
            log_level,
            bind_address,
            model_path,
            execution_provider,
            intra_threads,
            input_name,
            confidence_threshold,
            max_upload_bytes,
            max_image_pixels,
            otel_endpoint,
        })
    }

    /// Create default configuration for testing
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            log_level: LogLevel::Debug,
            bind_address: SocketAddr::from(([127, 0, 0, 1], 0)),
            model_path: "/models/model.onnx".to_string(),
            execution_provider: ExecutionProvider::Cpu,
            intra_threads: 1,
            input_name: "images".to_string(),
            confidence_threshold: 0.5,
            max_upload_bytes: 16 * 1024 * 1024,
            max_image_pixels: 40_000_000,
            otel_endpoint: None,
        }
    }
}
