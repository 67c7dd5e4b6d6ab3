pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod processing;
pub mod server;
pub mod service;

// Re-export commonly used types for convenience
pub use backend::{InferenceBackend, InferenceOutput};
pub use config::InferenceConfig;
pub use error::DetectError;
pub use server::{AppState, router};
pub use service::DetectionService;
