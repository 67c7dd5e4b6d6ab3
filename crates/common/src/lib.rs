pub mod config;
pub mod logging;
pub mod telemetry;
#[cfg(feature = "http")]
pub mod server;
#[cfg(feature = "http")]
pub mod upload;

pub use config::{Environment, LogLevel};
pub use logging::setup_logging;
pub use telemetry::{TelemetryGuard, init_observability};
#[cfg(feature = "http")]
pub use server::serve;
#[cfg(feature = "http")]
pub use upload::{UploadRejection, UploadedImage, read_upload};
