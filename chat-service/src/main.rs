use chat_service::config::ChatConfig;
use chat_service::services::{init_metrics, Bootstrap};
use chat_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = ChatConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    // Initialize tracing
    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing(
        "chat-service",
        &config.common.log_level,
        otlp_endpoint.as_deref(),
    );

    init_metrics().map_err(|e| {
        tracing::error!("Failed to initialize metrics: {}", e);
        std::io::Error::other(format!("Metrics error: {}", e))
    })?;

    // Degrades instead of failing when no key is configured
    let bootstrap = Bootstrap::from_env(&config);

    let app = Application::build(config, bootstrap).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
