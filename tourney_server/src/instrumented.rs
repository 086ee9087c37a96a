//! Store wrapper that logs and meters every call.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tourney::store::{StoreResult, TournamentStore};
use tourney::tournament::{ListOrder, Tournament, TournamentDraft, TournamentId};

use crate::{logging, metrics};

/// Wraps a backend, recording duration and outcome of each call
pub struct InstrumentedStore {
    inner: Arc<dyn TournamentStore>,
    backend: &'static str,
}

impl InstrumentedStore {
    pub fn new(inner: Arc<dyn TournamentStore>, backend: &'static str) -> Self {
        Self { inner, backend }
    }

    async fn observe<T, F>(&self, operation: &'static str, call: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        let start = Instant::now();
        let result = call.await;
        let elapsed = start.elapsed();

        let error = result.as_ref().err().map(|e| e.to_string());
        logging::log_store_operation(operation, self.backend, elapsed, error.as_deref());
        metrics::store_operations_total(operation, result.is_ok());
        metrics::store_operation_duration_ms(operation, elapsed.as_secs_f64() * 1000.0);

        result
    }
}

#[async_trait]
impl TournamentStore for InstrumentedStore {
    async fn list_all(&self, order: ListOrder) -> StoreResult<Vec<Tournament>> {
        self.observe("list", self.inner.list_all(order)).await
    }

    async fn insert(&self, draft: &TournamentDraft) -> StoreResult<()> {
        self.observe("insert", self.inner.insert(draft)).await
    }

    async fn update(&self, id: &TournamentId, draft: &TournamentDraft) -> StoreResult<()> {
        self.observe("update", self.inner.update(id, draft)).await
    }

    async fn delete(&self, id: &TournamentId) -> StoreResult<()> {
        self.observe("delete", self.inner.delete(id)).await
    }

    async fn upsert_many(&self, tournaments: &[Tournament]) -> StoreResult<()> {
        self.observe("upsert", self.inner.upsert_many(tournaments)).await
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.observe("health", self.inner.health_check()).await
    }
}
