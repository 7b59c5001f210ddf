use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::header;
use axum::middleware;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;

mod config;
mod error;
mod execute;
mod packages;
mod rate_limit;
mod registry;
mod reviews;
mod routes;
mod stats;
mod store;
mod validate;

#[cfg(test)]
mod tests;

use config::Config;
use config::StoreBackend;
use error::NebulaError;
use rate_limit::RateLimiter;
use registry::Registry;
use store::MemoryStore;
use store::RedbStore;
use store::RegistryStore;

#[derive(Clone)]
pub struct NebulaState {
    pub registry: Registry,
    pub limiter: Arc<RateLimiter>,
}

impl NebulaState {
    pub fn new(store: Arc<dyn RegistryStore>, config: &Config) -> Self {
        Self {
            registry: Registry::new(store),
            limiter: Arc::new(RateLimiter::new(&config.rate_limit)),
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins = if config.cors.origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(config.cors.origins.iter().filter_map(|origin| {
            match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    log::warn!("ignoring invalid cors origin: {origin}");
                    None
                }
            }
        }))
    };
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Every route is served at the root and again under `/api`.
pub fn build_server(state: NebulaState, config: &Config) -> Router {
    let api = routes::api_routes();
    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_requests,
        ))
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(CatchPanicLayer::custom(routes::internal_error))
        .layer(cors_layer(config))
        .layer(middleware::from_fn(routes::log_request))
        .with_state(state)
}

fn open_store(config: &Config) -> Result<Arc<dyn RegistryStore>> {
    Ok(match config.store.backend {
        StoreBackend::Redb => Arc::new(RedbStore::open(&config.store.path)?),
        StoreBackend::Memory => {
            log::warn!("using the in-memory store, nothing will be persisted");
            Arc::new(MemoryStore::default())
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load()?;
    let state = NebulaState::new(open_store(&config)?, &config);

    if rate_limit::spawn_cleanup(state.limiter.clone()).is_none() {
        log::info!("rate limiting disabled");
    }

    let app = build_server(state, &config);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}
