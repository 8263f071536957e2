// ==============================================================================
// main.rs - Proteomics Dashboard Entry Point
// ==============================================================================
// Description: Axum web server for the young-vs-old proteomics volcano dashboard
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderName, Method},
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod handlers;
mod middleware;
mod models;
mod session;
mod state;

use config::{DashboardConfig, LogFormat};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = DashboardConfig::from_env().context("Invalid dashboard configuration")?;
    init_tracing(config.log_format);

    info!("Starting Proteomics Dashboard v{}", env!("CARGO_PKG_VERSION"));
    info!("Workbook: {}", config.workbook_path.display());

    // Initialize application state
    let state = AppState::new(&config)
        .await
        .context("Failed to initialize application state")?;

    let app = build_router(state, &config.cors_allowed_origins);

    let addr = config.socket_addr();
    info!("Dashboard listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("proteomics_dashboard=info,proteomics_processor=info,tower_http=info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact().with_target(false))
            .init(),
    }
}

pub(crate) fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let api_routes = Router::new()
        .route("/sessions", post(handlers::create_session))
        .route("/volcano", get(handlers::get_volcano))
        // Slider change
        .route("/thresholds", put(handlers::update_thresholds))
        // Volcano click
        .route("/selection", post(handlers::select_gene))
        // Show All / Hide
        .route("/disclosure", post(handlers::toggle_disclosure))
        .route("/literature", get(handlers::get_literature));

    let allowed_origins: Vec<_> = cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_credentials(false)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-dashboard-session"),
        ])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .nest("/api/dashboard", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
