//! Trip document store
//!
//! One row per trip holding the whole aggregate as a JSON document, keyed by
//! `(owner_id, trip_id)`. Trips are written once; there is no update path.

use async_trait::async_trait;
use roamwise_common::{Error, Result};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use super::retry::{retry_on_lock, DEFAULT_MAX_LOCK_WAIT_MS};
use crate::models::{TripAggregate, TripSummary};

/// Persistence collaborator of the trip composer
#[async_trait]
pub trait TripStore: Send + Sync {
    /// Insert a new trip; an existing `(owner_id, trip_id)` is an error
    async fn put(&self, owner_id: &str, trip_id: Uuid, trip: &TripAggregate) -> Result<()>;

    async fn get(&self, owner_id: &str, trip_id: Uuid) -> Result<Option<TripAggregate>>;

    /// Returns whether a trip was removed
    async fn delete(&self, owner_id: &str, trip_id: Uuid) -> Result<bool>;

    /// Owner's trips, newest first
    async fn list(&self, owner_id: &str) -> Result<Vec<TripSummary>>;
}

/// SQLite-backed [`TripStore`]
#[derive(Clone)]
pub struct SqliteTripStore {
    pool: Pool<Sqlite>,
    max_lock_wait_ms: u64,
}

impl SqliteTripStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            pool,
            max_lock_wait_ms: DEFAULT_MAX_LOCK_WAIT_MS,
        }
    }
}

fn decode(owner_id: &str, json: &str) -> Result<TripAggregate> {
    serde_json::from_str(json)
        .map_err(|e| Error::Internal(format!("Corrupt trip document for {}: {}", owner_id, e)))
}

#[async_trait]
impl TripStore for SqliteTripStore {
    async fn put(&self, owner_id: &str, trip_id: Uuid, trip: &TripAggregate) -> Result<()> {
        let json = serde_json::to_string(trip)
            .map_err(|e| Error::Internal(format!("Serialize trip failed: {}", e)))?;
        let trip_id = trip_id.to_string();
        // Fixed-width UTC text so ORDER BY created_at sorts chronologically
        let created_at = trip
            .created_at
            .to_rfc3339_opts(chrono::SecondsFormat::Micros, true);

        let pool = &self.pool;
        let (trip_id, json, created_at) = (trip_id.as_str(), json.as_str(), created_at.as_str());

        retry_on_lock("trip insert", self.max_lock_wait_ms, || async move {
            sqlx::query(
                "INSERT INTO trips (owner_id, trip_id, aggregate, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(owner_id)
            .bind(trip_id)
            .bind(json)
            .bind(created_at)
            .execute(pool)
            .await?;
            Ok::<(), Error>(())
        })
        .await?;

        tracing::debug!(owner_id, trip_id, bytes = json.len(), "Trip stored");
        Ok(())
    }

    async fn get(&self, owner_id: &str, trip_id: Uuid) -> Result<Option<TripAggregate>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT aggregate FROM trips WHERE owner_id = ? AND trip_id = ?")
                .bind(owner_id)
                .bind(trip_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(json,)| decode(owner_id, &json)).transpose()
    }

    async fn delete(&self, owner_id: &str, trip_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM trips WHERE owner_id = ? AND trip_id = ?")
            .bind(owner_id)
            .bind(trip_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<TripSummary>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT trip_id, aggregate FROM trips WHERE owner_id = ? ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let mut summaries = Vec::with_capacity(rows.len());
        for (trip_id, json) in rows {
            match decode(owner_id, &json) {
                Ok(trip) => summaries.push(TripSummary::from(&trip)),
                Err(e) => tracing::warn!(
                    owner_id,
                    trip_id = %trip_id,
                    error = %e,
                    "Skipping unreadable trip"
                ),
            }
        }

        Ok(summaries)
    }
}
