//! REST backend for the hosted database service.
//!
//! Speaks the PostgREST dialect: `GET/POST/PATCH/DELETE` on
//! `{url}/rest/v1/{table}` with filters like `id=eq.<id>` and the API key in
//! both the `apikey` header and a bearer token.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

use super::timeouts::with_timeout;
use super::{StoreError, StoreResult, TournamentStore, check_table_name};
use crate::tournament::models::{
    ListOrder, Tournament, TournamentDraft, TournamentId, TournamentStatus,
};

/// Client for the remote `tournaments` collection
pub struct RestStore {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    #[serde(flatten)]
    draft: &'a TournamentDraft,
    current_participants: i32,
}

#[derive(Debug, Serialize)]
struct UpsertRow<'a> {
    id: &'a TournamentId,
    title: &'a str,
    banner_url: &'a str,
    status: TournamentStatus,
    max_participants: i32,
    current_participants: i32,
    prize_pool: f64,
    start_date: chrono::DateTime<chrono::Utc>,
}

impl<'a> From<&'a Tournament> for UpsertRow<'a> {
    fn from(t: &'a Tournament) -> Self {
        Self {
            id: &t.id,
            title: &t.title,
            banner_url: &t.banner_url,
            status: t.status,
            max_participants: t.max_participants,
            current_participants: t.current_participants,
            prize_pool: t.prize_pool,
            start_date: t.start_date,
        }
    }
}

/// Postgres `invalid_text_representation`, raised when a filter value does
/// not cast to the column type
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// Standard error body returned by the backend
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl RestStore {
    /// Create a client for `{base_url}/rest/v1/{table}`.
    ///
    /// # Errors
    ///
    /// `StoreError::InvalidTable` if `table` is not a plain identifier.
    pub fn new(base_url: &str, api_key: &str, table: &str, timeout: Duration) -> StoreResult<Self> {
        check_table_name(table)?;
        Ok(Self {
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
            timeout,
        })
    }

    /// Collection URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, &self.endpoint)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> StoreResult<Response> {
        self.send_for(operation, request, None).await
    }

    /// Like `send`, for requests filtered to one row. An id the `id` column
    /// cannot cast means no such row.
    async fn send_for(
        &self,
        operation: &str,
        request: RequestBuilder,
        id: Option<&TournamentId>,
    ) -> StoreResult<Response> {
        let start = Instant::now();
        let response = with_timeout(self.timeout, request.send()).await?;
        log::debug!(
            "{} {} -> {} in {}ms",
            operation,
            self.endpoint,
            response.status(),
            start.elapsed().as_millis()
        );
        error_for_status(response, id).await
    }

    /// Rows returned under `Prefer: return=representation`
    async fn affected_rows(&self, response: Response) -> StoreResult<usize> {
        let body = with_timeout(self.timeout, response.text()).await?;
        let rows: Vec<Value> = serde_json::from_str(&body)?;
        Ok(rows.len())
    }
}

/// Query-string `order` value for a listing order
pub fn order_param(order: ListOrder) -> &'static str {
    match order {
        ListOrder::StartDate => "start_date.asc,id.asc",
        ListOrder::Rank => "rank.asc.nullslast,start_date.asc,id.asc",
    }
}

/// Query-string filter selecting one row
pub fn id_filter(id: &TournamentId) -> String {
    format!("eq.{id}")
}

/// Upsert payload. Every object must carry the same keys, so `rank` is sent
/// for all rows (possibly `null`) as soon as any row has one.
pub fn upsert_payload(tournaments: &[Tournament]) -> StoreResult<Vec<Value>> {
    let include_rank = tournaments.iter().any(|t| t.rank.is_some());

    tournaments
        .iter()
        .map(|t| {
            let mut row = serde_json::to_value(UpsertRow::from(t))?;
            if include_rank {
                if let Value::Object(map) = &mut row {
                    map.insert("rank".to_string(), serde_json::to_value(t.rank)?);
                }
            }
            Ok(row)
        })
        .collect()
}

async fn error_for_status(response: Response, id: Option<&TournamentId>) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("Failed to read error response: {}", e));
    let (message, code) = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => (parsed.message, parsed.code),
        Err(_) => (body, None),
    };

    if let Some(id) = id {
        if code.as_deref() == Some(INVALID_TEXT_REPRESENTATION) {
            return Err(StoreError::NotFound(id.clone()));
        }
    }

    Err(StoreError::Service {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl TournamentStore for RestStore {
    async fn list_all(&self, order: ListOrder) -> StoreResult<Vec<Tournament>> {
        let request = self
            .request(Method::GET)
            .query(&[("select", "*"), ("order", order_param(order))]);

        let response = self.send("list", request).await?;
        let body = with_timeout(self.timeout, response.text()).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn insert(&self, draft: &TournamentDraft) -> StoreResult<()> {
        let rows = [InsertRow {
            draft,
            current_participants: 0,
        }];
        let request = self
            .request(Method::POST)
            .header("Prefer", "return=minimal")
            .json(&rows);

        self.send("insert", request).await?;
        Ok(())
    }

    async fn update(&self, id: &TournamentId, draft: &TournamentDraft) -> StoreResult<()> {
        let request = self
            .request(Method::PATCH)
            .query(&[("id", id_filter(id))])
            .header("Prefer", "return=representation")
            .json(draft);

        let response = self.send_for("update", request, Some(id)).await?;
        if self.affected_rows(response).await? == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn delete(&self, id: &TournamentId) -> StoreResult<()> {
        let request = self
            .request(Method::DELETE)
            .query(&[("id", id_filter(id))])
            .header("Prefer", "return=representation");

        let response = self.send_for("delete", request, Some(id)).await?;
        if self.affected_rows(response).await? == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn upsert_many(&self, tournaments: &[Tournament]) -> StoreResult<()> {
        if tournaments.is_empty() {
            return Ok(());
        }

        let payload = upsert_payload(tournaments)?;
        let request = self
            .request(Method::POST)
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&payload);

        self.send("upsert", request).await?;
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        let request = self
            .request(Method::GET)
            .query(&[("select", "id"), ("limit", "1")]);
        self.send("health", request).await?;
        Ok(())
    }
}
