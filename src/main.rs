use std::sync::Arc;

use tokio::sync::watch;

use workspace_ai::config::Config;
use workspace_ai::provider::openai::OpenAiBackend;
use workspace_ai::server::{start_server, GatewayState};
use workspace_ai::{logging, AppError};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load .env before reading any configuration (local dev convenience).
    dotenvy::dotenv().ok();
    logging::init();

    tracing::info!("Starting workspace-ai gateway v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    tracing::info!(
        model = %config.options.model,
        base_url = %config.base_url,
        "Provider configured"
    );

    let state = GatewayState {
        backend: Arc::new(OpenAiBackend::new(
            config.base_url.clone(),
            config.api_key.clone(),
        )),
        options: config.options.clone(),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received");
            let _ = shutdown_tx.send(true);
        }
    });

    start_server(config.bind_addr, state, shutdown_rx).await
}
