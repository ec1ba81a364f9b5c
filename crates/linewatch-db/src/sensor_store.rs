//! Batch insertion and time-ranged querying of archived sensor readings.
//!
//! Operations on the `sensor_data` table. One archive cycle produces one
//! batch: either the whole batch is attempted inside a single transaction
//! or none of it lands.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::archiver::ArchiveRow;
use crate::error::DbError;

/// Operations on the `sensor_data` table.
pub struct SensorDataStore<'a> {
    pool: &'a PgPool,
}

impl<'a> SensorDataStore<'a> {
    /// Create a new sensor-data store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Batch-insert one archive cycle's rows inside a single transaction.
    ///
    /// An empty batch is a no-op. Partial insertion is not an outcome:
    /// if any row fails the transaction rolls back.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn batch_insert(&self, rows: &[ArchiveRow]) -> Result<(), DbError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                r"INSERT INTO sensor_data (process_name, metric_name, value, recorded_at)
                  VALUES ($1, $2, $3, $4)",
            )
            .bind(&row.process_name)
            .bind(&row.metric_name)
            .bind(row.value)
            .bind(row.recorded_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(rows = rows.len(), "Inserted sensor-data batch");
        Ok(())
    }

    /// Query one metric's history since a timestamp, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn query_since(
        &self,
        process_name: &str,
        metric_name: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<SensorDataRow>, DbError> {
        let rows = sqlx::query_as::<_, SensorDataRow>(
            r"SELECT id, process_name, metric_name, value, recorded_at
              FROM sensor_data
              WHERE process_name = $1 AND metric_name = $2 AND recorded_at >= $3
              ORDER BY recorded_at",
        )
        .bind(process_name)
        .bind(metric_name)
        .bind(since)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// A row from the `sensor_data` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SensorDataRow {
    /// Auto-incremented row ID.
    pub id: i64,
    /// Lowercase process name (e.g. `pultrusion`).
    pub process_name: String,
    /// Metric name as it appears on the wire (e.g. `die_temp`).
    pub metric_name: String,
    /// Archived value, rounded to 2 decimal places at write time.
    pub value: f64,
    /// Timestamp assigned when the archive cycle wrote the row.
    pub recorded_at: DateTime<Utc>,
}
