use crate::config::{Environment, LogLevel};
use tracing_subscriber::{Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Extra layer stacked under the formatter, e.g. the OpenTelemetry bridge.
pub(crate) type ExportLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber: pretty output in development, JSON in
/// production.
///
/// `RUST_LOG` takes precedence over `log_level` when it is set.
pub fn setup_logging(log_level: LogLevel, environment: Environment) {
    install_subscriber(log_level, environment, None);
}

pub(crate) fn install_subscriber(
    log_level: LogLevel,
    environment: Environment,
    export: Option<ExportLayer>,
) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.as_str()));

    let registry = tracing_subscriber::registry().with(export).with(env_filter);

    match environment {
        Environment::Production => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_level(true))
                .init();
        }
        Environment::Development => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_ansi(true))
                .init();
        }
    }
}

/// Creates an info-level span and enters it.
#[macro_export]
macro_rules! span {
    ($name:literal) => {
        tracing::info_span!($name).entered()
    };
}
