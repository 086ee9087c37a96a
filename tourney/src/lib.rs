//! # Tourney
//!
//! Tournament listing and administration over a remote `tournaments`
//! collection.
//!
//! ## Core Modules
//!
//! - [`tournament`]: models, form validation, card view-model, re-ordering
//!   and the admin workflow
//! - [`store`]: the [`store::TournamentStore`] trait and its REST, Postgres
//!   and in-memory backends
//! - [`cache`]: keyed query cache with explicit invalidation
//!
//! Every view reads the list through one shared [`cache::QueryCache`]; any
//! successful create, update, delete or re-order invalidates it so the next
//! read re-fetches the whole collection.

/// Query cache shared by every view.
pub mod cache;

/// Remote data access.
pub mod store;
pub use store::{StoreError, StoreResult, TournamentStore};

/// Tournament domain and admin workflow.
pub mod tournament;
pub use tournament::{
    AdminError, Notice, Tournament, TournamentAdmin, TournamentCard, TournamentId,
    TournamentStatus,
};
