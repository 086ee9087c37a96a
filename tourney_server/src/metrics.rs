//! Prometheus metrics for monitoring the tournament server.
//!
//! Metrics are exposed in Prometheus text format on a separate listener
//! (`METRICS_BIND`). When no exporter is installed the recording calls are
//! no-ops.
//!
//! # Metrics
//!
//! - **HTTP**: `http_requests_total`, `http_request_duration_ms`
//! - **Store**: `store_operations_total`, `store_operation_duration_ms`
//! - **Cache**: `cache_events_total`
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tourney_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("GET", "/", 200);
//! ```

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;
use tourney::cache::CacheStats;

use crate::logging;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Errors
///
/// Fails if the exporter cannot be installed or bound.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

/// Middleware recording count and latency per matched route
pub async fn track_http(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    // Route templates keep label cardinality bounded
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    http_requests_total(&method, &path, status);
    http_request_duration_ms(&method, &path, elapsed.as_secs_f64() * 1000.0);
    logging::log_api_request(&method, &path, status, elapsed.as_millis() as u64);

    response
}

// ============================================================================
// Store Metrics
// ============================================================================

/// Count a store call by operation and outcome.
pub fn store_operations_total(operation: &str, success: bool) {
    metrics::counter!("store_operations_total",
        "op" => operation.to_string(),
        "outcome" => if success { "ok" } else { "error" }
    )
    .increment(1);
}

/// Record store call duration in milliseconds.
pub fn store_operation_duration_ms(operation: &str, duration_ms: f64) {
    metrics::histogram!("store_operation_duration_ms",
        "op" => operation.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Cache Metrics
// ============================================================================

/// Publish the cache's running totals.
pub fn cache_events(stats: CacheStats) {
    metrics::counter!("cache_events_total", "event" => "hit").absolute(stats.hits);
    metrics::counter!("cache_events_total", "event" => "miss").absolute(stats.misses);
    metrics::counter!("cache_events_total", "event" => "invalidation")
        .absolute(stats.invalidations);
}
