//! Irrigation Weather Service - server entry point

use std::net::SocketAddr;

use irrigation_server::{create_app, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()?;

    // Initialize tracing
    let fmt_layer = if config.logging.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "irrigation_server=debug,tower_http=debug".into()),
        )
        .with(fmt_layer)
        .init();

    tracing::info!("Starting Irrigation Weather Service");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!(
        weather = ?config.weather.provider,
        timezone = ?config.timezone.provider,
        geocoder = ?config.geocoder.provider,
        cache = config.cache.enabled,
        "Providers selected"
    );

    // Create application state
    let state = AppState::from_config(&config)?;

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
