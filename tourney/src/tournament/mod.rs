//! Tournament domain: models, form validation, card view-model, re-ordering
//! and the admin workflow that ties them to a store.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tourney::cache::QueryCache;
//! use tourney::store::MemoryStore;
//! use tourney::tournament::{MoveDirection, ReorderMode, TournamentAdmin, TournamentCard};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let admin = TournamentAdmin::new(
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(QueryCache::new()),
//!         ReorderMode::StartDate,
//!     );
//!
//!     for t in admin.tournaments().await? {
//!         let card = TournamentCard::from(&t);
//!         println!("{} {}", card.title, card.participants_label());
//!     }
//!
//!     admin.move_item(0, MoveDirection::Down).await;
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod card;
pub mod form;
pub mod models;
pub mod reorder;

pub use admin::{
    AdminError, AdminResult, AdminUiState, FormMode, FormState, Notice, NoticeLevel,
    SubmitOutcome, TournamentAdmin,
};
pub use card::{StatusBadge, TournamentCard, format_prize_pool, format_start_date, status_badge};
pub use form::{FieldError, FieldErrors, FormField, TournamentInput, validate};
pub use models::{ListOrder, Tournament, TournamentDraft, TournamentId, TournamentStatus};
pub use reorder::{MoveDirection, MovePlan, ReorderMode, plan_move};
