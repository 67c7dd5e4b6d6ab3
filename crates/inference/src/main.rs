use inference::{
    AppState, DetectionService, InferenceConfig, backend::InferenceBackend,
    logging::setup_logging, router,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[cfg(feature = "ort-backend")]
use inference::backend::ort::OrtBackend as Backend;

#[cfg(not(feature = "ort-backend"))]
compile_error!("The 'ort-backend' feature must be enabled to build the inference binary");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = InferenceConfig::from_env()?;

    let _telemetry = setup_logging(&config)?;

    tracing::info!(
        config = ?config,
        "Loaded configuration"
    );

    tracing::info!(model_path = %config.model_path, "Loading inference model");
    let backend: Option<Arc<dyn InferenceBackend>> = match Backend::load_model(&config) {
        Ok(backend) => {
            tracing::info!("Model loaded successfully");
            Some(Arc::new(backend) as Arc<dyn InferenceBackend>)
        }
        Err(e) => {
            // Keep serving so /health can report the failure.
            tracing::error!(
                model_path = %config.model_path,
                "Failed to load model: {:#}",
                e
            );
            None
        }
    };

    let service = DetectionService::new(backend, &config);
    let app = router(AppState { service }, config.max_upload_bytes);

    let listener = TcpListener::bind(config.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Inference service listening");

    common::serve(listener, app).await
}
