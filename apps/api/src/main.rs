use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use campus::api_client::HttpCourseApi;
use campus::config::Config;
use campus::curriculum::CurriculumCatalog;
use campus::routes::build_router;
use campus::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Campus course player v{}", env!("CARGO_PKG_VERSION"));

    // Initialize course API client
    let api = HttpCourseApi::new(
        &config.course_api_url,
        config.course_api_token.clone(),
        config.course_api_timeout,
    )?;
    info!("Course API client initialized ({})", config.course_api_url);

    // Curriculum catalog is pure data, built once
    let catalog = CurriculumCatalog::builtin();
    info!("Curriculum catalog loaded ({} curricula)", catalog.len());

    let state = AppState::new(Arc::new(api), catalog, config.view_idle_ttl);
    info!("Idle course views expire after {:?}", config.view_idle_ttl);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the portal origin once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
