use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use dotenv::dotenv;
use inkwell_api::{App, blog, config::ServerConfig, identity, notification, store::PgStore};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = ServerConfig::new_from_env();
    init_tracing(&config);

    let store = match PgStore::connect(
        &config.database_url,
        config.database_pool_size,
        config.database_acquire_timeout,
    ) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(?e, "Could not create the database pool");
            std::process::exit(1)
        }
    };

    let cors = cors_layer(&config);
    let listen_addr = config.listen_addr;

    let app = App {
        store: Arc::new(store),
        config: Arc::new(config),
    };

    let router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/posts", blog::routes::route())
        .nest("/notifications", notification::routes::route())
        .nest("/identity", identity::routes::route())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app);

    let listener = match TcpListener::bind(listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(?e, %listen_addr, "Could not bind listener");
            std::process::exit(1)
        }
    };

    tracing::info!("Listening on {listen_addr}");

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(?e, "Server exited with an error");
    }
}

fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);

    if config.is_dev() {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() && config.is_dev() {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(origins)
    };

    // Credentials are needed for the auth cookie, which rules out wildcards
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(?e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }

    tracing::info!("Received Ctrl+C, shutting down");
}
