//! Data access for the `tournaments` collection.
//!
//! Every operation is a round-trip to a remote store. [`TournamentStore`] is
//! the seam the rest of the crate programs against; the backends are:
//!
//! - [`RestStore`]: the hosted backend's REST interface (PostgREST dialect)
//! - [`PgStore`]: a direct PostgreSQL connection
//! - [`MemoryStore`]: in-process, for tests and local development
//!
//! None of them retry, and `upsert_many` is not atomic over REST.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::tournament::models::{ListOrder, Tournament, TournamentDraft, TournamentId};

pub mod config;
pub mod memory;
pub mod postgres;
pub mod rest;
pub mod timeouts;

pub use config::{StoreBackend, StoreConfig};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use rest::RestStore;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport error talking to the REST backend
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Database error from the Postgres backend
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backend answered with a non-success status
    #[error("Store returned {status}: {message}")]
    Service { status: u16, message: String },

    /// No row with this ID
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    /// The call did not finish in time
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Table name is not a plain SQL identifier
    #[error("Invalid table name: {0}")]
    InvalidTable(String),
}

impl StoreError {
    /// Message safe to show to an end user.
    pub fn client_message(&self) -> String {
        match self {
            StoreError::Http(_) | StoreError::Database(_) | StoreError::Decode(_) => {
                "Store unavailable".to_string()
            }
            StoreError::Service { status, .. } => format!("Store rejected the request ({status})"),
            _ => self.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Only `[A-Za-z_][A-Za-z0-9_]*` is accepted. Backends interpolate the name
/// into SQL or a URL path.
pub fn check_table_name(table: &str) -> StoreResult<()> {
    let mut chars = table.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidTable(table.to_string()))
    }
}

/// Operations against the remote `tournaments` collection
#[async_trait]
pub trait TournamentStore: Send + Sync {
    /// Fetch the whole collection in the given order
    async fn list_all(&self, order: ListOrder) -> StoreResult<Vec<Tournament>>;

    /// Insert a new row. The store assigns `id` and timestamps and sets
    /// `current_participants` to 0.
    async fn insert(&self, draft: &TournamentDraft) -> StoreResult<()>;

    /// Overwrite every editable field of the row with `id`
    async fn update(&self, id: &TournamentId, draft: &TournamentDraft) -> StoreResult<()>;

    /// Remove the row with `id`
    async fn delete(&self, id: &TournamentId) -> StoreResult<()>;

    /// Insert-or-replace each row by `id`
    async fn upsert_many(&self, tournaments: &[Tournament]) -> StoreResult<()>;

    /// Check the store is reachable
    async fn health_check(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_hides_internals() {
        let err = StoreError::Service {
            status: 500,
            message: "relation \"tournaments\" does not exist".to_string(),
        };
        assert_eq!(err.client_message(), "Store rejected the request (500)");

        let err = StoreError::NotFound(TournamentId::from("abc"));
        assert!(err.client_message().contains("abc"));

        let err = StoreError::Timeout(Duration::from_secs(5));
        assert!(err.client_message().contains("timed out"));
    }

    #[test]
    fn test_table_name_check() {
        assert!(check_table_name("tournaments").is_ok());
        assert!(check_table_name("_staging_2").is_ok());
        assert!(check_table_name("").is_err());
        assert!(check_table_name("2fast").is_err());
        assert!(check_table_name("bad name/../x?y=1").is_err());
        assert!(matches!(
            check_table_name("t\"; DROP TABLE x; --"),
            Err(StoreError::InvalidTable(_))
        ));
    }
}
