//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// REST collaborator around the matching engine, built on Axum. The transport
// holds a reference to the engine only; real-time broadcasting hangs off the
// engine's MarketListener registration, not off this layer.
//
// | Component | Description                                          |
// |-----------|------------------------------------------------------|
// | AppState  | Shared handle to the engine                          |
// | Api       | Router construction, CORS, serve loop                |
// | routes    | Handler functions                                    |
// | dto       | Request/response payloads                            |
// | error     | ApiError -> HTTP status mapping                      |
//--------------------------------------------------------------------------------------------------

mod dto;
mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Extension, Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::engine::MatchingEngine;

pub use dto::*;
pub use error::{ApiError, ApiResult};

/// Shared application state accessible by all handlers.
pub struct AppState {
    /// The matching engine this API fronts.
    pub engine: Arc<MatchingEngine>,
}

/// The REST API server.
pub struct Api {
    addr: SocketAddr,
    state: Arc<AppState>,
    allowed_origins: Vec<String>,
}

impl Api {
    /// Creates an API instance fronting `engine`.
    pub fn new(addr: SocketAddr, engine: Arc<MatchingEngine>, allowed_origins: &[String]) -> Self {
        Self {
            addr,
            state: Arc::new(AppState { engine }),
            allowed_origins: allowed_origins.to_vec(),
        }
    }

    /// Builds the router with all routes and the CORS layer attached.
    pub fn routes(&self) -> Router {
        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(%origin, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

        Router::new()
            // Health check
            .route("/health", get(routes::health))
            // Order management
            .route("/orders", post(routes::create_order))
            .route("/orders/:id", get(routes::get_order))
            .route("/orders/:id", put(routes::modify_order))
            .route("/orders/:id", delete(routes::cancel_order))
            // Market data
            .route("/book/:symbol", get(routes::get_depth))
            .route("/book/:symbol/metrics", get(routes::get_metrics))
            // Per-user views
            .route("/users/:user_id/orders", get(routes::user_orders))
            .route("/users/:user_id/trades", get(routes::user_trades))
            // System
            .route("/stats", get(routes::get_stats))
            .layer(Extension(self.state.clone()))
            .layer(cors)
    }

    /// Serves the API until the process receives Ctrl-C.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.routes();
        info!(addr = %self.addr, "API listening");

        let listener = TcpListener::bind(self.addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutdown signal received");
            })
            .await?;

        Ok(())
    }
}
