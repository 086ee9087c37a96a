//! PostgreSQL backend.
//!
//! Talks to the same `tournaments` table the hosted service exposes, over a
//! direct connection pool. Expects `id uuid` with a server-side default and
//! `created_at`/`updated_at` as `timestamptz` (see `migrations/`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;
use uuid::Uuid;

use super::config::DatabaseConfig;
use super::timeouts::with_timeout;
use super::{StoreError, StoreResult, TournamentStore, check_table_name};
use crate::tournament::models::{
    ListOrder, Tournament, TournamentDraft, TournamentId, TournamentStatus,
};

/// Connection pool bound to one tournaments table
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    table: String,
    timeout: Duration,
}

impl PgStore {
    /// Open a connection pool
    ///
    /// # Errors
    ///
    /// Fails if the table name is not a plain identifier or the database
    /// cannot be reached.
    pub async fn connect(
        config: &DatabaseConfig,
        table: &str,
        timeout: Duration,
    ) -> StoreResult<Self> {
        check_table_name(table)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self {
            pool,
            table: table.to_string(),
            timeout,
        })
    }

    /// Close the connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }

    fn select_sql(&self, order: ListOrder) -> String {
        // `rank` only exists on tables set up for rank ordering
        let (rank, order_by) = match order {
            ListOrder::StartDate => ("NULL::int4 AS rank", "start_date ASC, id ASC"),
            ListOrder::Rank => ("rank", "rank ASC NULLS LAST, start_date ASC, id ASC"),
        };
        format!(
            r#"SELECT id::text AS id, title, banner_url, status, max_participants,
                      current_participants, prize_pool::float8 AS prize_pool, start_date,
                      {rank}, created_at, updated_at
               FROM "{table}"
               ORDER BY {order_by}"#,
            table = self.table
        )
    }
}

/// The `id` column is a `uuid`; anything else cannot name a row.
fn row_uuid(id: &TournamentId) -> StoreResult<Uuid> {
    Uuid::parse_str(id.as_str()).map_err(|_| StoreError::NotFound(id.clone()))
}

fn tournament_from_row(row: &PgRow) -> Result<Tournament, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<TournamentStatus>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(Tournament {
        id: TournamentId::new(row.try_get::<String, _>("id")?),
        title: row.try_get("title")?,
        banner_url: row.try_get("banner_url")?,
        status,
        max_participants: row.try_get("max_participants")?,
        current_participants: row.try_get("current_participants")?,
        prize_pool: row.try_get("prize_pool")?,
        start_date: row.try_get::<DateTime<Utc>, _>("start_date")?,
        rank: row.try_get("rank")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl TournamentStore for PgStore {
    async fn list_all(&self, order: ListOrder) -> StoreResult<Vec<Tournament>> {
        let sql = self.select_sql(order);
        let rows = with_timeout(self.timeout, sqlx::query(&sql).fetch_all(&self.pool)).await?;

        rows.iter()
            .map(|r| tournament_from_row(r).map_err(StoreError::from))
            .collect()
    }

    async fn insert(&self, draft: &TournamentDraft) -> StoreResult<()> {
        let sql = format!(
            r#"INSERT INTO "{}" (title, banner_url, status, max_participants, current_participants, prize_pool, start_date)
               VALUES ($1, $2, $3, $4, 0, $5, $6)"#,
            self.table
        );

        with_timeout(
            self.timeout,
            sqlx::query(&sql)
                .bind(&draft.title)
                .bind(&draft.banner_url)
                .bind(draft.status.as_str())
                .bind(draft.max_participants)
                .bind(draft.prize_pool)
                .bind(draft.start_date)
                .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn update(&self, id: &TournamentId, draft: &TournamentDraft) -> StoreResult<()> {
        let uuid = row_uuid(id)?;
        let sql = format!(
            r#"UPDATE "{}"
               SET title = $2, banner_url = $3, status = $4, max_participants = $5,
                   prize_pool = $6, start_date = $7, updated_at = now()
               WHERE id = $1::uuid"#,
            self.table
        );

        let result = with_timeout(
            self.timeout,
            sqlx::query(&sql)
                .bind(uuid.to_string())
                .bind(&draft.title)
                .bind(&draft.banner_url)
                .bind(draft.status.as_str())
                .bind(draft.max_participants)
                .bind(draft.prize_pool)
                .bind(draft.start_date)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn delete(&self, id: &TournamentId) -> StoreResult<()> {
        let uuid = row_uuid(id)?;
        let sql = format!(r#"DELETE FROM "{}" WHERE id = $1::uuid"#, self.table);

        let result = with_timeout(
            self.timeout,
            sqlx::query(&sql).bind(uuid.to_string()).execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn upsert_many(&self, tournaments: &[Tournament]) -> StoreResult<()> {
        if tournaments.is_empty() {
            return Ok(());
        }

        let with_rank = tournaments.iter().any(|t| t.rank.is_some());
        let (rank_column, rank_value, rank_update) = if with_rank {
            (", rank", ", $9", ", rank = EXCLUDED.rank")
        } else {
            ("", "", "")
        };
        let sql = format!(
            r#"INSERT INTO "{table}" (id, title, banner_url, status, max_participants, current_participants, prize_pool, start_date{rank_column})
               VALUES ($1::uuid, $2, $3, $4, $5, $6, $7, $8{rank_value})
               ON CONFLICT (id) DO UPDATE SET
                   title = EXCLUDED.title,
                   banner_url = EXCLUDED.banner_url,
                   status = EXCLUDED.status,
                   max_participants = EXCLUDED.max_participants,
                   current_participants = EXCLUDED.current_participants,
                   prize_pool = EXCLUDED.prize_pool,
                   start_date = EXCLUDED.start_date,
                   updated_at = now(){rank_update}"#,
            table = self.table
        );

        with_timeout(self.timeout, async {
            let mut tx = self.pool.begin().await?;
            for t in tournaments {
                let mut query = sqlx::query(&sql)
                    .bind(t.id.as_str())
                    .bind(&t.title)
                    .bind(&t.banner_url)
                    .bind(t.status.as_str())
                    .bind(t.max_participants)
                    .bind(t.current_participants)
                    .bind(t.prize_pool)
                    .bind(t.start_date);
                if with_rank {
                    query = query.bind(t.rank);
                }
                query.execute(&mut *tx).await?;
            }
            tx.commit().await
        })
        .await
    }

    async fn health_check(&self) -> StoreResult<()> {
        with_timeout(self.timeout, sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_uuid_id_is_not_found() {
        let id = TournamentId::from("nope");
        assert!(matches!(row_uuid(&id), Err(StoreError::NotFound(found)) if found == id));

        let id = TournamentId::new(Uuid::new_v4().to_string());
        assert!(row_uuid(&id).is_ok());
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_table_before_connecting() {
        let config = DatabaseConfig {
            database_url: "postgres://nobody@localhost:1/none".to_string(),
            ..DatabaseConfig::default()
        };
        let result = PgStore::connect(&config, "bad name", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(StoreError::InvalidTable(_))));
    }

    #[tokio::test]
    async fn test_postgres_round_trip() {
        // Needs a reachable database with the schema from migrations/
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            return;
        };
        let config = DatabaseConfig {
            database_url,
            ..DatabaseConfig::default()
        };
        let store = PgStore::connect(&config, "tournaments", Duration::from_secs(5))
            .await
            .expect("Failed to connect to database");
        store.health_check().await.expect("Health check failed");

        let draft = TournamentDraft {
            title: format!("pg-test-{}", uuid::Uuid::new_v4()),
            banner_url: "https://example.com/pg.png".to_string(),
            status: TournamentStatus::Upcoming,
            max_participants: 4,
            prize_pool: 12.5,
            start_date: Utc::now(),
        };
        store.insert(&draft).await.unwrap();

        let rows = store.list_all(ListOrder::StartDate).await.unwrap();
        let row = rows.iter().find(|t| t.title == draft.title).unwrap();
        assert_eq!(row.current_participants, 0);
        assert_eq!(row.prize_pool, 12.5);

        store.delete(&row.id).await.unwrap();
        store.close().await;
    }
}
