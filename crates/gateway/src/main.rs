use gateway::{AppState, InferenceClient, get_configuration, logging::setup_logging, router};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_configuration()?;

    let _telemetry = setup_logging(&config)?;

    tracing::info!(
        config = ?config,
        "Loaded configuration"
    );

    let client = InferenceClient::new(&config.inference_url, config.request_timeout())?;
    tracing::info!(url = client.detect_url(), "Forwarding uploads to inference service");

    let app = router(AppState::new(client), config.max_upload_bytes);

    let listener = TcpListener::bind(config.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Gateway listening");

    common::serve(listener, app).await
}
