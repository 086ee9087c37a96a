//! In-process store.
//!
//! Behaves like the remote collection (server-assigned UUID ids and
//! timestamps, ordered listing, not-found on missing ids) and records every
//! call it receives so tests can assert on the traffic a workflow produced.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{StoreError, StoreResult, TournamentStore};
use crate::tournament::models::{ListOrder, Tournament, TournamentDraft, TournamentId};

/// One call received by a [`MemoryStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    ListAll(ListOrder),
    Insert(TournamentDraft),
    Update(TournamentId, TournamentDraft),
    Delete(TournamentId),
    UpsertMany(Vec<Tournament>),
}

#[derive(Default)]
struct Inner {
    rows: Vec<Tournament>,
    calls: Vec<StoreCall>,
    failing: bool,
}

/// In-memory `tournaments` collection
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with rows, as if they had been inserted earlier.
    pub fn with_rows(rows: Vec<Tournament>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                rows,
                ..Inner::default()
            }),
        }
    }

    /// Every call received so far, oldest first.
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().await.calls.clone()
    }

    /// Forget recorded calls.
    pub async fn clear_calls(&self) {
        self.inner.lock().await.calls.clear();
    }

    /// Make every subsequent call fail with a service error (or stop failing).
    pub async fn set_failing(&self, failing: bool) {
        self.inner.lock().await.failing = failing;
    }

    /// Current rows in insertion order, without recording a call.
    pub async fn snapshot(&self) -> Vec<Tournament> {
        self.inner.lock().await.rows.clone()
    }
}

impl Inner {
    fn record(&mut self, call: StoreCall) -> StoreResult<()> {
        self.calls.push(call);
        if self.failing {
            return Err(StoreError::Service {
                status: 503,
                message: "store unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn position(&self, id: &TournamentId) -> StoreResult<usize> {
        self.rows
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

#[async_trait]
impl TournamentStore for MemoryStore {
    async fn list_all(&self, order: ListOrder) -> StoreResult<Vec<Tournament>> {
        let mut inner = self.inner.lock().await;
        inner.record(StoreCall::ListAll(order))?;

        let mut rows = inner.rows.clone();
        order.sort(&mut rows);
        Ok(rows)
    }

    async fn insert(&self, draft: &TournamentDraft) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.record(StoreCall::Insert(draft.clone()))?;

        let id = TournamentId::new(Uuid::new_v4().to_string());
        inner.rows.push(Tournament::from_draft(id, draft, Utc::now()));
        Ok(())
    }

    async fn update(&self, id: &TournamentId, draft: &TournamentDraft) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.record(StoreCall::Update(id.clone(), draft.clone()))?;

        let index = inner.position(id)?;
        let row = &mut inner.rows[index];
        row.apply(draft);
        row.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete(&self, id: &TournamentId) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.record(StoreCall::Delete(id.clone()))?;

        let index = inner.position(id)?;
        inner.rows.remove(index);
        Ok(())
    }

    async fn upsert_many(&self, tournaments: &[Tournament]) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.record(StoreCall::UpsertMany(tournaments.to_vec()))?;

        let now = Utc::now();
        for incoming in tournaments {
            let mut row = incoming.clone();
            row.updated_at = Some(now);
            match inner.rows.iter().position(|t| t.id == incoming.id) {
                Some(index) => {
                    row.created_at = inner.rows[index].created_at;
                    inner.rows[index] = row;
                }
                None => {
                    row.created_at = Some(now);
                    inner.rows.push(row);
                }
            }
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        if self.inner.lock().await.failing {
            return Err(StoreError::Service {
                status: 503,
                message: "store unavailable".to_string(),
            });
        }
        Ok(())
    }
}
