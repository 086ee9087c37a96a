//! HTTP API for the tournament server.
//!
//! # Modules
//!
//! - [`pages`]: server-rendered public and admin pages
//! - [`tournaments`]: JSON API over the same admin operations
//! - [`request_id`]: request correlation middleware
//!
//! # Endpoints
//!
//! ```text
//! GET  /                                  - Public page: list + admin
//! GET  /admin                             - Admin page
//! GET  /admin/new                         - Admin page with the create form
//! GET  /admin/{id}/edit                   - Admin page with the edit form
//! POST /admin/tournaments                 - Create (urlencoded form)
//! POST /admin/tournaments/{id}            - Update (urlencoded form)
//! POST /admin/tournaments/{id}/delete     - Delete
//! POST /admin/move/{index}/{up|down}      - Swap with neighbour
//!
//! GET    /api/v1/tournaments              - List
//! POST   /api/v1/tournaments              - Create
//! PUT    /api/v1/tournaments/{id}         - Update
//! DELETE /api/v1/tournaments/{id}         - Delete
//! POST   /api/v1/tournaments/move         - Swap with neighbour
//!
//! GET  /health                            - Store health
//! ```
//!
//! Admin routes append `?from=index` to return to `/` instead of `/admin`.
//! There is no authentication.

pub mod pages;
pub mod request_id;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use serde_json::json;
use std::sync::Arc;
use tourney::TournamentAdmin;
use tower_http::cors::CorsLayer;

use crate::metrics;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub admin: Arc<TournamentAdmin>,
}

/// Create the complete router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use tourney_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route("/", get(pages::index))
        .route("/admin", get(pages::admin))
        .route("/admin/new", get(pages::new_form))
        .route("/admin/{id}/edit", get(pages::edit_form))
        .route("/admin/tournaments", post(pages::create))
        .route("/admin/tournaments/{id}", post(pages::update))
        .route("/admin/tournaments/{id}/delete", post(pages::delete))
        .route("/admin/move/{index}/{direction}", post(pages::move_item));

    Router::new()
        .merge(page_routes)
        .route("/health", get(health_check))
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(metrics::track_http))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/tournaments",
            get(tournaments::list_tournaments).post(tournaments::create_tournament),
        )
        .route("/tournaments/move", post(tournaments::move_tournament))
        .route(
            "/tournaments/{id}",
            put(tournaments::update_tournament).delete(tournaments::delete_tournament),
        )
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers, `503 Service Unavailable`
/// otherwise.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","store":true,"cache":{"hits":4,...},"timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = match state.admin.store().health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            false
        }
    };

    let stats = state.admin.cache().stats();
    metrics::cache_events(stats);

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "reorder_mode": state.admin.reorder_mode(),
        "cache": {
            "hits": stats.hits,
            "misses": stats.misses,
            "invalidations": stats.invalidations,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
