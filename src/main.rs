// Chat proxy backend
// Forwards widget chat requests to one configured LLM provider (Gemini or
// OpenRouter) and answers in the Gemini envelope either way

use axum::Router;
use std::fmt::Write as FmtWrite;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Custom time formatter: [HH:mm:ss] [proxy]
#[derive(Clone)]
struct ProxyTimer;

impl FormatTime for ProxyTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(w, "[{}] [proxy]", now.format("%H:%M:%S"))
    }
}

mod config;
mod llm;
mod models;
mod routes;

use config::Config;
use routes::{chat_routes, health_routes};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    // Format: [HH:mm:ss] [proxy] message
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_proxy_backend=info,tower_http=info".into()),
        )
        .with(
            fmt::layer()
                .with_timer(ProxyTimer)
                .with_target(false)
                .with_level(false)
                .with_ansi(true),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load and validate config
    let config = Config::from_env();
    if let Err(e) = config.validate() {
        tracing::error!("Configuration error: {}", e);
    }

    // Create app state
    let state = AppState {
        config: Arc::new(config.clone()),
    };

    // Any frontend origin may call the proxy
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(health_routes())
        .merge(chat_routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(
        "Starting chat proxy on {} (provider: {})",
        addr,
        config.provider.as_str()
    );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
