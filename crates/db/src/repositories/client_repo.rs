//! Repository for the `clients` table.

use handover_core::delivery::reconcile_delivered_at;
use handover_core::types::{DbId, Timestamp};

use crate::models::client::{Client, NewClient};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, code, first_name, last_name, delivered, delivered_at, delivery_note, project_id";

/// Provides lookup and state-transition operations for clients.
pub struct ClientRepo;

impl ClientRepo {
    /// Insert a batch of pending clients in a single transaction.
    ///
    /// The import pipeline calls this once per accumulated batch to
    /// avoid one-write-per-row overhead on large recipient lists.
    pub async fn insert_batch(pool: &DbPool, batch: &[NewClient]) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        for client in batch {
            sqlx::query(
                "INSERT INTO clients (code, first_name, last_name, delivered, project_id) \
                 VALUES (?, ?, ?, 0, ?)",
            )
            .bind(&client.code)
            .bind(&client.first_name)
            .bind(&client.last_name)
            .bind(client.project_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    /// Find a client by its unique scannable code.
    pub async fn find_by_code(pool: &DbPool, code: &str) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE code = ?");
        sqlx::query_as::<_, Client>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Full snapshot of every client, in insertion order.
    pub async fn list_all(pool: &DbPool) -> Result<Vec<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients ORDER BY id");
        sqlx::query_as::<_, Client>(&query).fetch_all(pool).await
    }

    /// Full-row replace by primary key; the manual edit path.
    ///
    /// The delivered/delivered_at pair is reconciled before the write, so
    /// an edit can never persist `delivered` without a timestamp or a
    /// timestamp without `delivered`: setting the flag with no recorded
    /// time stamps `now`, clearing the flag clears the time.
    ///
    /// Returns `None` if no row with the client's id exists.
    pub async fn update(
        pool: &DbPool,
        client: &Client,
        now: Timestamp,
    ) -> Result<Option<Client>, sqlx::Error> {
        let delivered_at = reconcile_delivered_at(client.delivered, client.delivered_at, now);
        let query = format!(
            "UPDATE clients SET \
                code = ?, first_name = ?, last_name = ?, \
                delivered = ?, delivered_at = ?, delivery_note = ?, project_id = ? \
             WHERE id = ? \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(&client.code)
            .bind(&client.first_name)
            .bind(&client.last_name)
            .bind(client.delivered)
            .bind(delivered_at)
            .bind(&client.delivery_note)
            .bind(client.project_id)
            .bind(client.id)
            .fetch_optional(pool)
            .await
    }

    /// Mark a pending client delivered, recording the timestamp and note.
    ///
    /// The `delivered = 0` guard makes confirmation idempotent at the SQL
    /// level: a second call matches no row and returns `None`, leaving
    /// the first confirmation's timestamp untouched.
    pub async fn mark_delivered(
        pool: &DbPool,
        id: DbId,
        note: Option<&str>,
        now: Timestamp,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "UPDATE clients SET delivered = 1, delivered_at = ?, delivery_note = ? \
             WHERE id = ? AND delivered = 0 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(now)
            .bind(note)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Remove every client. First step of a re-import. Returns the
    /// number of rows removed.
    pub async fn delete_all(pool: &DbPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clients").execute(pool).await?;
        Ok(result.rows_affected())
    }
}
