//! Admin workflow: list, create, edit, delete and re-order tournaments.
//!
//! [`TournamentAdmin`] is shared by the public page and the admin page. Reads
//! go through the query cache; every successful mutation invalidates it.
//!
//! Each mutation comes in two flavours: a `Result` API (`save`, `remove`,
//! `reorder`) and a UI wrapper (`submit`, `delete`, `move_item`) that logs
//! failures and turns the outcome into a [`Notice`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use super::form::{validate, FieldErrors, TournamentInput};
use super::models::{Tournament, TournamentId};
use super::reorder::{plan_move, MoveDirection, ReorderMode};
use crate::cache::{QueryCache, QueryKey};
use crate::store::{StoreError, TournamentStore};

/// Admin errors
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("Invalid tournament: {0}")]
    Validation(FieldErrors),
}

pub type AdminResult<T> = Result<T, AdminError>;

/// Transient notification shown after an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Error => "error",
        }
    }
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Whether the form creates a new row or edits an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(TournamentId),
}

impl FormMode {
    pub fn is_edit(&self) -> bool {
        matches!(self, FormMode::Edit(_))
    }
}

/// Local UI state of the admin view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AdminUiState {
    #[default]
    Closed,
    Creating,
    Editing(TournamentId),
}

impl AdminUiState {
    /// Form mode for an open form, `None` when closed.
    pub fn form_mode(&self) -> Option<FormMode> {
        match self {
            AdminUiState::Closed => None,
            AdminUiState::Creating => Some(FormMode::Create),
            AdminUiState::Editing(id) => Some(FormMode::Edit(id.clone())),
        }
    }
}

/// An open form: its mode, the values shown, and any field errors
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub mode: FormMode,
    pub input: TournamentInput,
    pub errors: FieldErrors,
}

/// What happened to a form submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Saved; the form closes
    Saved(Notice),
    /// Rejected before any store call; the form stays open
    Invalid(FormState),
    /// The store call failed; the form stays open with the entered values
    Failed(FormState, Notice),
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Admin service over a store and the shared cache
#[derive(Clone)]
pub struct TournamentAdmin {
    store: Arc<dyn TournamentStore>,
    cache: Arc<QueryCache<Vec<Tournament>>>,
    mode: ReorderMode,
    clock: Clock,
}

impl TournamentAdmin {
    pub fn new(
        store: Arc<dyn TournamentStore>,
        cache: Arc<QueryCache<Vec<Tournament>>>,
        mode: ReorderMode,
    ) -> Self {
        Self {
            store,
            cache,
            mode,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock, used for form defaults and re-dating on moves.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn reorder_mode(&self) -> ReorderMode {
        self.mode
    }

    pub fn store(&self) -> &Arc<dyn TournamentStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<QueryCache<Vec<Tournament>>> {
        &self.cache
    }

    /// The tournament list, from cache or freshly fetched.
    pub async fn tournaments(&self) -> AdminResult<Vec<Tournament>> {
        let order = self.mode.list_order();
        let store = self.store.clone();
        let list = self
            .cache
            .get_or_fetch(QueryKey::Tournaments, || async move {
                store.list_all(order).await
            })
            .await?;
        Ok(list)
    }

    /// Look up one tournament in the current list.
    pub async fn find(&self, id: &TournamentId) -> AdminResult<Tournament> {
        self.tournaments()
            .await?
            .into_iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| AdminError::NotFound(id.clone()))
    }

    /// Blank form for a new tournament.
    pub fn open_create(&self) -> FormState {
        FormState {
            mode: FormMode::Create,
            input: TournamentInput::new_defaults((self.clock)()),
            errors: FieldErrors::default(),
        }
    }

    /// Form pre-populated with an existing tournament.
    pub async fn open_edit(&self, id: &TournamentId) -> AdminResult<FormState> {
        let tournament = self.find(id).await?;
        Ok(FormState {
            mode: FormMode::Edit(id.clone()),
            input: TournamentInput::from_tournament(&tournament),
            errors: FieldErrors::default(),
        })
    }

    /// Open the form matching a UI state.
    pub async fn open_form(&self, state: &AdminUiState) -> AdminResult<Option<FormState>> {
        match state.form_mode() {
            None => Ok(None),
            Some(FormMode::Create) => Ok(Some(self.open_create())),
            Some(FormMode::Edit(id)) => self.open_edit(&id).await.map(Some),
        }
    }

    /// Validate and persist a form. Invalid input never reaches the store.
    pub async fn save(&self, mode: &FormMode, input: &TournamentInput) -> AdminResult<()> {
        let draft = validate(input).map_err(AdminError::Validation)?;

        match mode {
            FormMode::Create => self.store.insert(&draft).await?,
            FormMode::Edit(id) => self.store.update(id, &draft).await?,
        }

        self.cache.invalidate(QueryKey::Tournaments).await;
        Ok(())
    }

    /// Form submission with notices.
    pub async fn submit(&self, mode: FormMode, input: TournamentInput) -> SubmitOutcome {
        match self.save(&mode, &input).await {
            Ok(()) => {
                let message = if mode.is_edit() {
                    "Tournament updated successfully"
                } else {
                    "Tournament created successfully"
                };
                log::info!("{message}");
                SubmitOutcome::Saved(Notice::success(message))
            }
            Err(AdminError::Validation(errors)) => SubmitOutcome::Invalid(FormState {
                mode,
                input,
                errors,
            }),
            Err(e) => {
                log::error!("Error saving tournament: {}", e);
                SubmitOutcome::Failed(
                    FormState {
                        mode,
                        input,
                        errors: FieldErrors::default(),
                    },
                    Notice::error("Failed to save tournament"),
                )
            }
        }
    }

    /// Delete one tournament by id.
    pub async fn remove(&self, id: &TournamentId) -> AdminResult<()> {
        self.store.delete(id).await.map_err(|e| match e {
            StoreError::NotFound(id) => AdminError::NotFound(id),
            other => AdminError::Store(other),
        })?;
        self.cache.invalidate(QueryKey::Tournaments).await;
        Ok(())
    }

    /// Delete with a notice.
    pub async fn delete(&self, id: &TournamentId) -> Notice {
        match self.remove(id).await {
            Ok(()) => {
                log::info!("Deleted tournament {}", id);
                Notice::success("Tournament deleted successfully")
            }
            Err(e) => {
                log::error!("Error deleting tournament: {}", e);
                Notice::error("Failed to delete tournament")
            }
        }
    }

    /// Swap the tournament at `index` with its neighbour.
    ///
    /// Returns `false`, without touching the store, when the neighbour does
    /// not exist.
    pub async fn reorder(&self, index: usize, direction: MoveDirection) -> AdminResult<bool> {
        let current = self.tournaments().await?;
        let Some(plan) = plan_move(&current, index, direction, self.mode, (self.clock)()) else {
            return Ok(false);
        };

        self.store.upsert_many(&plan.upserts).await?;
        self.cache.invalidate(QueryKey::Tournaments).await;
        Ok(true)
    }

    /// Move with a notice; `None` for an out-of-range move.
    pub async fn move_item(&self, index: usize, direction: MoveDirection) -> Option<Notice> {
        match self.reorder(index, direction).await {
            Ok(true) => Some(Notice::success("Tournament order updated")),
            Ok(false) => None,
            Err(e) => {
                log::error!("Error updating tournament order: {}", e);
                Some(Notice::error("Failed to update tournament order"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{MemoryStore, StoreCall};
    use crate::tournament::models::TournamentStatus;
    use chrono::TimeZone;

    fn input(title: &str) -> TournamentInput {
        TournamentInput {
            title: title.to_string(),
            banner_url: "https://example.com/banner.jpg".to_string(),
            max_participants: "64".to_string(),
            prize_pool: "1500".to_string(),
            start_date: "2024-05-01T10:00".to_string(),
            status: "in-progress".to_string(),
        }
    }

    fn admin(store: Arc<MemoryStore>) -> TournamentAdmin {
        TournamentAdmin::new(store, Arc::new(QueryCache::new()), ReorderMode::StartDate)
    }

    #[tokio::test]
    async fn test_open_create_uses_clock() {
        let now = Utc.with_ymd_and_hms(2024, 9, 9, 9, 9, 0).unwrap();
        let admin = admin(Arc::new(MemoryStore::new())).with_clock(move || now);

        let form = admin.open_create();
        assert_eq!(form.mode, FormMode::Create);
        assert_eq!(form.input.start_date, "2024-09-09T09:09:00.000");
        assert!(form.errors.is_empty());
    }

    #[tokio::test]
    async fn test_submit_create_then_edit() {
        let store = Arc::new(MemoryStore::new());
        let admin = admin(store.clone());

        let outcome = admin.submit(FormMode::Create, input("Spring Cup")).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Saved(Notice::success("Tournament created successfully"))
        );

        let list = admin.tournaments().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, TournamentStatus::InProgress);

        let mut form = admin.open_edit(&list[0].id).await.unwrap();
        assert_eq!(form.input.title, "Spring Cup");
        form.input.title = "Spring Cup II".to_string();

        let outcome = admin.submit(form.mode.clone(), form.input).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Saved(Notice::success("Tournament updated successfully"))
        );
        assert_eq!(admin.tournaments().await.unwrap()[0].title, "Spring Cup II");
    }

    #[tokio::test]
    async fn test_invalid_submit_makes_no_store_call() {
        let store = Arc::new(MemoryStore::new());
        let admin = admin(store.clone());

        let outcome = admin.submit(FormMode::Create, input("")).await;
        match outcome {
            SubmitOutcome::Invalid(form) => {
                assert_eq!(form.input.banner_url, "https://example.com/banner.jpg");
                assert_eq!(form.errors.len(), 1);
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
        assert!(store.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_keeps_form_open() {
        let store = Arc::new(MemoryStore::new());
        store.set_failing(true).await;
        let admin = admin(store.clone());

        let outcome = admin.submit(FormMode::Create, input("Kept")).await;
        match outcome {
            SubmitOutcome::Failed(form, notice) => {
                assert_eq!(form.input.title, "Kept");
                assert_eq!(notice, Notice::error("Failed to save tournament"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_open_edit_unknown_id() {
        let admin = admin(Arc::new(MemoryStore::new()));
        let err = admin.open_edit(&TournamentId::from("nope")).await.unwrap_err();
        assert!(matches!(err, AdminError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_notices() {
        let store = Arc::new(MemoryStore::new());
        let admin = admin(store.clone());
        admin.save(&FormMode::Create, &input("Doomed")).await.unwrap();
        let id = admin.tournaments().await.unwrap()[0].id.clone();

        assert_eq!(
            admin.delete(&id).await,
            Notice::success("Tournament deleted successfully")
        );
        assert!(admin.tournaments().await.unwrap().is_empty());
        assert_eq!(admin.delete(&id).await, Notice::error("Failed to delete tournament"));
    }

    #[tokio::test]
    async fn test_ui_state_form_mode() {
        assert_eq!(AdminUiState::Closed.form_mode(), None);
        assert_eq!(AdminUiState::Creating.form_mode(), Some(FormMode::Create));
        let id = TournamentId::from("t");
        assert_eq!(
            AdminUiState::Editing(id.clone()).form_mode(),
            Some(FormMode::Edit(id))
        );

        let admin = admin(Arc::new(MemoryStore::new()));
        assert!(admin.open_form(&AdminUiState::Closed).await.unwrap().is_none());
        assert!(admin.open_form(&AdminUiState::Creating).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_move_failure_notice() {
        let store = Arc::new(MemoryStore::new());
        let admin = admin(store.clone());
        admin.save(&FormMode::Create, &input("A")).await.unwrap();
        admin.save(&FormMode::Create, &input("B")).await.unwrap();
        admin.tournaments().await.unwrap();

        store.set_failing(true).await;
        assert_eq!(
            admin.move_item(0, MoveDirection::Down).await,
            Some(Notice::error("Failed to update tournament order"))
        );
        assert!(matches!(
            store.calls().await.last(),
            Some(StoreCall::UpsertMany(rows)) if rows.len() == 2
        ));
    }
}
