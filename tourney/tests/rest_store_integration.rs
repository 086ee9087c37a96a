//! Integration tests for the REST store backend
//!
//! Each test starts a stub of the hosted REST interface on a random local
//! port, points a [`RestStore`] at it and checks the requests it receives.

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::any;
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tourney::store::{RestStore, StoreError, TournamentStore};
use tourney::tournament::{
    ListOrder, Tournament, TournamentDraft, TournamentId, TournamentStatus,
};

const API_KEY: &str = "test-anon-key";

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    path: String,
    query: HashMap<String, String>,
    headers: HeaderMap,
    body: String,
}

impl Seen {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Clone, Default)]
struct Stub {
    seen: Arc<Mutex<Vec<Seen>>>,
    replies: Arc<Mutex<VecDeque<(StatusCode, String)>>>,
    delay: Option<Duration>,
}

impl Stub {
    fn reply(&self, status: StatusCode, body: impl Into<String>) {
        self.replies.lock().unwrap().push_back((status, body.into()));
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

async fn handle(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    stub.seen.lock().unwrap().push(Seen {
        method,
        path: uri.path().to_string(),
        query,
        headers,
        body,
    });
    if let Some(delay) = stub.delay {
        tokio::time::sleep(delay).await;
    }
    let reply = stub.replies.lock().unwrap().pop_front();
    reply.unwrap_or((StatusCode::OK, "[]".to_string()))
}

async fn start(stub: Stub, timeout: Duration) -> RestStore {
    let app = Router::new()
        .route("/rest/v1/{table}", any(handle))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    RestStore::new(&format!("http://{addr}/"), API_KEY, "tournaments", timeout).unwrap()
}

fn draft() -> TournamentDraft {
    TournamentDraft {
        title: "Summer Championship 2024".to_string(),
        banner_url: "https://example.com/summer.jpg".to_string(),
        status: TournamentStatus::Upcoming,
        max_participants: 100,
        prize_pool: 10000.0,
        start_date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    }
}

fn row(id: &str, rank: Option<i32>) -> Tournament {
    Tournament {
        id: TournamentId::from(id),
        title: "Winter Classic".to_string(),
        banner_url: "https://example.com/winter.jpg".to_string(),
        status: TournamentStatus::InProgress,
        max_participants: 64,
        current_participants: 48,
        prize_pool: 5000.0,
        start_date: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        rank,
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    }
}

fn assert_auth(seen: &Seen) {
    assert_eq!(seen.path, "/rest/v1/tournaments");
    assert_eq!(seen.header("apikey"), Some(API_KEY));
    assert_eq!(
        seen.header("authorization"),
        Some(format!("Bearer {API_KEY}").as_str())
    );
}

#[tokio::test]
async fn test_list_all_requests_ordered_select() {
    let stub = Stub::default();
    stub.reply(
        StatusCode::OK,
        json!([
            {
                "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
                "title": "Summer Championship 2024",
                "banner_url": "https://example.com/summer.jpg",
                "status": "upcoming",
                "max_participants": 100,
                "current_participants": 75,
                "prize_pool": 10000,
                "start_date": "2024-06-01T00:00:00+00:00",
                "created_at": "2024-01-01T00:00:00+00:00",
                "updated_at": "2024-01-01T00:00:00+00:00"
            }
        ])
        .to_string(),
    );
    let store = start(stub.clone(), Duration::from_secs(5)).await;

    let rows = store.list_all(ListOrder::StartDate).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].current_participants, 75);
    assert_eq!(rows[0].prize_pool, 10000.0);
    assert_eq!(rows[0].rank, None);

    let seen = stub.seen();
    assert_eq!(seen[0].method, Method::GET);
    assert_auth(&seen[0]);
    assert_eq!(seen[0].query["select"], "*");
    assert_eq!(seen[0].query["order"], "start_date.asc,id.asc");
}

#[tokio::test]
async fn test_list_all_by_rank() {
    let stub = Stub::default();
    let store = start(stub.clone(), Duration::from_secs(5)).await;

    assert!(store.list_all(ListOrder::Rank).await.unwrap().is_empty());
    assert_eq!(
        stub.seen()[0].query["order"],
        "rank.asc.nullslast,start_date.asc,id.asc"
    );
}

#[tokio::test]
async fn test_insert_sends_zero_participants() {
    let stub = Stub::default();
    stub.reply(StatusCode::CREATED, "");
    let store = start(stub.clone(), Duration::from_secs(5)).await;

    store.insert(&draft()).await.unwrap();

    let seen = &stub.seen()[0];
    assert_eq!(seen.method, Method::POST);
    assert_auth(seen);
    assert_eq!(seen.header("prefer"), Some("return=minimal"));
    let body = seen.json();
    assert_eq!(body[0]["current_participants"], 0);
    assert_eq!(body[0]["title"], "Summer Championship 2024");
    assert!(body[0].get("id").is_none());
}

#[tokio::test]
async fn test_update_filters_by_id() {
    let stub = Stub::default();
    stub.reply(StatusCode::OK, json!([{ "id": "abc" }]).to_string());
    let store = start(stub.clone(), Duration::from_secs(5)).await;

    store.update(&TournamentId::from("abc"), &draft()).await.unwrap();

    let seen = &stub.seen()[0];
    assert_eq!(seen.method, Method::PATCH);
    assert_eq!(seen.query["id"], "eq.abc");
    assert_eq!(seen.header("prefer"), Some("return=representation"));
    let body = seen.json();
    assert_eq!(body["status"], "upcoming");
    assert_eq!(body["max_participants"], 100);
    assert!(body.get("current_participants").is_none());
}

#[tokio::test]
async fn test_update_and_delete_of_missing_row_are_not_found() {
    let stub = Stub::default();
    let store = start(stub.clone(), Duration::from_secs(5)).await;
    let id = TournamentId::from("gone");

    let err = store.update(&id, &draft()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(ref missing) if *missing == id));

    let err = store.delete(&id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let seen = stub.seen();
    assert_eq!(seen[1].method, Method::DELETE);
    assert_eq!(seen[1].query["id"], "eq.gone");
}

#[tokio::test]
async fn test_id_that_does_not_cast_is_not_found() {
    let stub = Stub::default();
    let cast_error = json!({
        "code": "22P02",
        "details": null,
        "hint": null,
        "message": "invalid input syntax for type uuid: \"nope\""
    })
    .to_string();
    stub.reply(StatusCode::BAD_REQUEST, cast_error.clone());
    stub.reply(StatusCode::BAD_REQUEST, cast_error.clone());
    stub.reply(StatusCode::BAD_REQUEST, cast_error);
    let store = start(stub.clone(), Duration::from_secs(5)).await;
    let id = TournamentId::from("nope");

    let err = store.update(&id, &draft()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(ref missing) if *missing == id));

    let err = store.delete(&id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    // Outside an id filter the code is an ordinary service error
    let err = store.list_all(ListOrder::StartDate).await.unwrap_err();
    assert!(matches!(err, StoreError::Service { status: 400, .. }));
}

#[tokio::test]
async fn test_upsert_many_merges_on_id() {
    let stub = Stub::default();
    stub.reply(StatusCode::CREATED, "");
    let store = start(stub.clone(), Duration::from_secs(5)).await;

    store
        .upsert_many(&[row("a", Some(0)), row("b", Some(1))])
        .await
        .unwrap();

    let seen = &stub.seen()[0];
    assert_eq!(seen.method, Method::POST);
    assert_eq!(seen.query["on_conflict"], "id");
    assert_eq!(
        seen.header("prefer"),
        Some("resolution=merge-duplicates,return=minimal")
    );
    let body = seen.json();
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[1]["id"], "b");
    assert_eq!(body[1]["rank"], 1);
    assert_eq!(body[1]["current_participants"], 48);
    assert!(body[1].get("created_at").is_none());
}

#[tokio::test]
async fn test_upsert_of_nothing_sends_nothing() {
    let stub = Stub::default();
    let store = start(stub.clone(), Duration::from_secs(5)).await;

    store.upsert_many(&[]).await.unwrap();
    assert!(stub.seen().is_empty());
}

#[tokio::test]
async fn test_service_error_message_is_extracted() {
    let stub = Stub::default();
    stub.reply(
        StatusCode::UNAUTHORIZED,
        json!({ "message": "Invalid API key", "hint": null }).to_string(),
    );
    stub.reply(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded");
    let store = start(stub.clone(), Duration::from_secs(5)).await;

    match store.list_all(ListOrder::StartDate).await {
        Err(StoreError::Service { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API key");
        }
        other => panic!("expected service error, got {other:?}"),
    }

    match store.delete(&TournamentId::from("x")).await {
        Err(StoreError::Service { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("expected service error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_store_times_out() {
    let stub = Stub {
        delay: Some(Duration::from_secs(2)),
        ..Stub::default()
    };
    let store = start(stub, Duration::from_millis(100)).await;

    let err = store.health_check().await.unwrap_err();
    assert!(matches!(err, StoreError::Timeout(_)));
}

#[tokio::test]
async fn test_unreachable_store_is_http_error() {
    let store = RestStore::new(
        "http://127.0.0.1:1",
        API_KEY,
        "tournaments",
        Duration::from_secs(2),
    )
    .unwrap();
    let err = store.list_all(ListOrder::StartDate).await.unwrap_err();
    assert!(matches!(err, StoreError::Http(_)));
    assert_eq!(err.client_message(), "Store unavailable");
}
