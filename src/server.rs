//! HTTP server wiring
//!
//! Builds the shared lookup service from a [`ServerConfig`], mounts the routes
//! and serves until Ctrl+C or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    cache::{spawn_sweeper, SweeperConfig, TtlCache},
    cli::{CatalogSource, ServerConfig},
    clock::SystemClock,
    data::{Catalog, CatalogStore, StoreError},
    routes::{health_handler, search_handler, shelf_life_handler, AppState},
    service::LookupService,
};

const DEFAULT_LOG_FILTER: &str = "shelflife=info,tower_http=info";

/// Errors that stop the server from starting or running
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to load catalog: {0}")]
    Catalog(#[from] StoreError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Installs the global tracing subscriber, honoring `RUST_LOG`
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();
}

/// Loads the catalog named by `source`
pub fn load_catalog(source: &CatalogSource) -> Result<Catalog, StoreError> {
    match source {
        CatalogSource::File(path) => {
            info!("Loading catalog from {}", path.display());
            Catalog::from_json_file(path)
        }
        CatalogSource::Builtin => {
            info!("Using built-in catalog");
            Ok(Catalog::builtin())
        }
    }
}

/// Builds the lookup service over `catalog` with a system-clock search cache
///
/// When the sweeper is disabled the cache purges expired entries on insert
/// instead.
pub fn build_service(
    catalog: Catalog,
    search_ttl: Duration,
    sweeper: &SweeperConfig,
) -> Arc<LookupService> {
    let clock = Arc::new(SystemClock);
    let store = Arc::new(CatalogStore::new(catalog));
    let cache = Arc::new(
        TtlCache::with_clock(search_ttl, clock.clone()).purge_on_insert(!sweeper.is_active()),
    );

    Arc::new(LookupService::new(store, cache, clock))
}

/// CORS policy: any origin when none is configured, otherwise only that one
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = match &config.cors_origin {
        Some(origin) => AllowOrigin::exact(origin.clone()),
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

/// The application routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/Product/shelf-life", get(shelf_life_handler))
        .route("/api/Product/search", get(search_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Runs the server until a shutdown signal arrives
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    info!("Initializing state...");
    let catalog = load_catalog(&config.catalog)?;
    info!(products = catalog.len(), "Catalog loaded");

    let service = build_service(catalog, config.search_ttl, &config.sweeper);
    let sweeper = spawn_sweeper(service.cache(), config.sweeper.clone());

    let app = router(service)
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http());

    info!("Binding to {}", config.address);
    let listener = TcpListener::bind(config.address).await?;
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        } else {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
