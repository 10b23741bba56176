//! HTTP transport for the remote-control API
//!
//! Owns the router, the shared application state, and the listener lifecycle.
//! Requests fan out to handlers in [`handlers`]; cross-request state is the
//! configuration, the device controllers, and the per-family rate limiters.

pub mod handlers;
pub mod models;
pub mod rate_limiter;

use crate::config::{CommandLimits, ServerConfig};
use crate::devices::{Chromecast, DeviceController, Ps5, SamsungTv};
use crate::error::{DenError, Result};
use crate::invoker::{CommandInvoker, Invoker};
use axum::routing::{get, post};
use axum::Router;
use rate_limiter::RateLimiter;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Interval of the background pass evicting stale rate-limit entries
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Handler-facing alias for the shared state
pub type SharedState = Arc<AppState>;

/// Independent rate limiters, one per command family
pub struct CommandLimiters {
    pub cast_control: RateLimiter,
    pub key_press: RateLimiter,
    pub app_launch: RateLimiter,
}

impl CommandLimiters {
    fn new(limits: &CommandLimits) -> Self {
        Self {
            cast_control: RateLimiter::new(limits.cast_control.clone()),
            key_press: RateLimiter::new(limits.key_press.clone()),
            app_launch: RateLimiter::new(limits.app_launch.clone()),
        }
    }

    /// Evict stale entries from every family
    pub async fn prune(&self) {
        self.cast_control.prune().await;
        self.key_press.prune().await;
        self.app_launch.prune().await;
    }
}

/// Shared application state behind every handler
pub struct AppState {
    pub config: ServerConfig,
    pub tv: Arc<SamsungTv>,
    pub cast: Arc<Chromecast>,
    pub ps5: Arc<Ps5>,
    pub limits: CommandLimiters,
}

impl AppState {
    /// Build the state from validated configuration and an invoker
    pub fn new(config: ServerConfig, invoker: Arc<dyn CommandInvoker>) -> Result<Self> {
        let tv = Arc::new(SamsungTv::new(config.tv.clone(), invoker.clone())?);
        let cast = Arc::new(Chromecast::new(config.cast.clone(), invoker.clone()));
        let ps5 = Arc::new(Ps5::new(config.ps5.clone(), invoker));
        let limits = CommandLimiters::new(&config.limits);
        Ok(Self {
            config,
            tv,
            cast,
            ps5,
            limits,
        })
    }

    /// All controllers behind their common read-only surface
    pub fn controllers(&self) -> Vec<Arc<dyn DeviceController>> {
        vec![
            self.tv.clone() as Arc<dyn DeviceController>,
            self.cast.clone() as Arc<dyn DeviceController>,
            self.ps5.clone() as Arc<dyn DeviceController>,
        ]
    }
}

/// Build the router with all endpoints and layers
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/status", get(handlers::aggregate_status))
        .route("/api/tv/key", post(handlers::tv_key))
        .route("/api/tv/app", post(handlers::tv_app))
        .route("/api/tv/status", get(handlers::tv_status))
        .route("/api/tv/wake", post(handlers::tv_wake))
        .route("/api/cast/control", post(handlers::cast_control))
        .route("/api/cast/cast", post(handlers::cast_media))
        .route("/api/cast/app", post(handlers::cast_app))
        .route("/api/cast/status", get(handlers::cast_status))
        .route("/api/ps5/power", post(handlers::ps5_power))
        .route("/api/ps5/status", get(handlers::ps5_status))
        .route("/api/ps5/control", post(handlers::ps5_control))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(handlers::handle_panic))
        .with_state(state)
}

/// Run the server until shutdown
pub async fn serve(config: ServerConfig) -> Result<()> {
    config.validate()?;

    let invoker: Arc<dyn CommandInvoker> = Arc::new(Invoker::new()?);
    let state = Arc::new(AppState::new(config, invoker)?);
    let app = router(state.clone());

    let prune_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            prune_state.limits.prune().await;
        }
    });

    let addr = format!("{}:{}", state.config.http.host, state.config.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 den-remote listening on http://{addr}");
    info!("   TV: {}", state.config.tv.host);
    info!("   Chromecast: {}", state.config.cast.host);
    info!("   PS5: {}", state.config.ps5.host);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DenError::connection(format!("HTTP server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down...");
    }
}
