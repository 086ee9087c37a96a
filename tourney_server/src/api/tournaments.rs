//! Tournament JSON API handlers.
//!
//! The same admin operations as the pages, for scripted clients.
//!
//! # Examples
//!
//! List tournaments:
//! ```bash
//! curl http://localhost:8080/api/v1/tournaments
//! ```
//!
//! Create one:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/tournaments \
//!   -H "Content-Type: application/json" \
//!   -d '{"title": "Spring Cup", "banner_url": "https://example.com/b.jpg",
//!        "max_participants": "64", "prize_pool": "1000",
//!        "start_date": "2024-04-15T18:00", "status": "upcoming"}'
//! ```
//!
//! Move the first row down:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/tournaments/move \
//!   -H "Content-Type: application/json" -d '{"index": 0, "direction": "down"}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tourney::store::StoreError;
use tourney::tournament::{
    AdminError, FieldErrors, FormMode, MoveDirection, Tournament, TournamentId, TournamentInput,
};

use super::AppState;
use super::request_id::RequestId;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub index: usize,
    pub direction: MoveDirection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoveResponse {
    /// `false` when the neighbour did not exist and nothing was written
    pub moved: bool,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map an admin error to a status code and a body safe to show clients
fn error_response(err: AdminError, request_id: &RequestId) -> ApiError {
    let (status, error, fields) = match err {
        AdminError::Validation(fields) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation failed".to_string(),
            Some(fields),
        ),
        AdminError::NotFound(id) | AdminError::Store(StoreError::NotFound(id)) => (
            StatusCode::NOT_FOUND,
            format!("Tournament not found: {id}"),
            None,
        ),
        AdminError::Store(e) => {
            tracing::error!(request_id = %request_id.as_str(), error = %e, "Store call failed");
            (StatusCode::BAD_GATEWAY, e.client_message(), None)
        }
    };

    (
        status,
        Json(ErrorResponse {
            error,
            fields,
            request_id: Some(request_id.as_str().to_string()),
        }),
    )
}

/// List all tournaments in display order.
///
/// # Errors
///
/// - `502 Bad Gateway`: the store could not be read
pub async fn list_tournaments(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Result<Json<Vec<Tournament>>, ApiError> {
    state
        .admin
        .tournaments()
        .await
        .map(Json)
        .map_err(|e| error_response(e, &request_id))
}

/// Create a tournament. `current_participants` always starts at 0.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: one or more fields are invalid
/// - `502 Bad Gateway`: the store rejected the insert
pub async fn create_tournament(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(input): Json<TournamentInput>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state
        .admin
        .save(&FormMode::Create, &input)
        .await
        .map_err(|e| error_response(e, &request_id))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Tournament created successfully".to_string(),
        }),
    ))
}

/// Overwrite every editable field of a tournament.
///
/// # Errors
///
/// - `404 Not Found`: no tournament with this ID
/// - `422 Unprocessable Entity`: one or more fields are invalid
/// - `502 Bad Gateway`: the store rejected the update
pub async fn update_tournament(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
    Json(input): Json<TournamentInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .admin
        .save(&FormMode::Edit(TournamentId::new(id)), &input)
        .await
        .map_err(|e| error_response(e, &request_id))?;

    Ok(Json(MessageResponse {
        message: "Tournament updated successfully".to_string(),
    }))
}

/// Delete a tournament.
///
/// # Errors
///
/// - `404 Not Found`: no tournament with this ID
/// - `502 Bad Gateway`: the store rejected the delete
pub async fn delete_tournament(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .admin
        .remove(&TournamentId::new(id))
        .await
        .map_err(|e| error_response(e, &request_id))?;

    Ok(Json(MessageResponse {
        message: "Tournament deleted successfully".to_string(),
    }))
}

/// Swap the tournament at `index` with its neighbour.
///
/// A move past either end of the list returns `{"moved": false}`.
///
/// # Errors
///
/// - `502 Bad Gateway`: the list could not be read or the upsert failed
pub async fn move_tournament(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let moved = state
        .admin
        .reorder(request.index, request.direction)
        .await
        .map_err(|e| error_response(e, &request_id))?;

    Ok(Json(MoveResponse { moved }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn request_id() -> RequestId {
        RequestId("req-1".to_string())
    }

    #[test]
    fn test_store_errors_are_sanitized() {
        let err = AdminError::Store(StoreError::Service {
            status: 500,
            message: "relation does not exist".to_string(),
        });
        let (status, Json(body)) = error_response(err, &request_id());

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.error, "Store rejected the request (500)");
        assert_eq!(body.request_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_not_found_from_store_is_404() {
        let err = AdminError::Store(StoreError::NotFound(TournamentId::from("x")));
        let (status, _) = error_response(err, &request_id());
        assert_eq!(status, StatusCode::NOT_FOUND);

        let err = AdminError::Store(StoreError::Timeout(Duration::from_secs(5)));
        let (status, _) = error_response(err, &request_id());
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
