pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod server;

pub use client::InferenceClient;
pub use config::{GatewayConfig, get_configuration};
pub use error::ProxyError;
pub use server::{AppState, router};
