//! Structured logging configuration.
//!
//! The library logs through the `log` facade; the subscriber installed here
//! picks those records up alongside the server's own `tracing` events.

use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Store calls slower than this are logged as warnings
const SLOW_STORE_CALL: Duration = Duration::from_millis(500);

/// Initialize structured logging
///
/// Log levels come from `RUST_LOG`, defaulting to
/// `info,sqlx=warn,hyper=warn`.
///
/// # Example
///
/// ```no_run
/// use tourney_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log one store call
///
/// # Arguments
///
/// * `operation` - Store operation (`list`, `insert`, `update`, ...)
/// * `backend` - Backend name
/// * `elapsed` - Call duration
/// * `error` - Error message if the call failed
pub fn log_store_operation(operation: &str, backend: &str, elapsed: Duration, error: Option<&str>) {
    let duration_ms = elapsed.as_millis() as u64;

    if let Some(error) = error {
        tracing::warn!(
            operation = operation,
            backend = backend,
            duration_ms = duration_ms,
            error = error,
            "Store operation failed"
        );
    } else if elapsed > SLOW_STORE_CALL {
        tracing::warn!(
            operation = operation,
            backend = backend,
            duration_ms = duration_ms,
            "Slow store operation"
        );
    } else {
        tracing::debug!(
            operation = operation,
            backend = backend,
            duration_ms = duration_ms,
            "Store operation"
        );
    }
}

/// Log API request/response
///
/// # Arguments
///
/// * `method` - HTTP method
/// * `path` - Matched route
/// * `status_code` - Response status code
/// * `duration_ms` - Request duration in milliseconds
pub fn log_api_request(method: &str, path: &str, status_code: u16, duration_ms: u64) {
    if status_code >= 500 {
        tracing::warn!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request failed"
        );
    } else {
        tracing::info!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_store_operation() {
        // Just ensure it doesn't panic
        log_store_operation("list", "memory", Duration::from_millis(3), None);
        log_store_operation("upsert", "rest", Duration::from_secs(2), None);
        log_store_operation("delete", "postgres", Duration::from_millis(10), Some("boom"));
    }

    #[test]
    fn test_log_api_request() {
        log_api_request("GET", "/", 200, 12);
        log_api_request("POST", "/admin/tournaments", 502, 120);
    }
}
