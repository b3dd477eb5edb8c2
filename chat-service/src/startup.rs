//! Application startup and lifecycle management.
//!
//! One HTTP server carries the chat API, the health and diagnostics
//! endpoints, Prometheus metrics and the static frontend.

use crate::config::{ChatConfig, CorsConfig};
use crate::handlers;
use crate::services::Bootstrap;
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, REQUEST_ID_HEADER};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: ChatConfig,
    pub bootstrap: Arc<Bootstrap>,
}

impl AppState {
    pub fn new(config: ChatConfig, bootstrap: Bootstrap) -> Self {
        Self {
            config,
            bootstrap: Arc::new(bootstrap),
        }
    }
}

/// Build the full router for `state`.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.frontend.static_dir.clone();
    let index = ServeFile::new(static_dir.join("frontend.html"));
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route("/chat", post(handlers::chat))
        .route("/health", get(handlers::health_check))
        .route("/test", get(handlers::live_probe))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route_service("/", index)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(from_fn(handlers::http_metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    /// Bind the listener (port 0 = random port for testing) and build the router.
    pub async fn build(config: ChatConfig, bootstrap: Bootstrap) -> Result<Self, AppError> {
        let addr = (config.common.host.clone(), config.common.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}:{}: {}", addr.0, addr.1, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let state = AppState::new(config, bootstrap);
        let router = build_router(state.clone());

        tracing::info!(
            port,
            gemini_client_ready = state.bootstrap.is_ready(),
            "Listening on {}",
            port
        );

        Ok(Self {
            port,
            listener,
            router,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
