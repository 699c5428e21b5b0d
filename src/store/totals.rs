//! Total Store
//!
//! The single-row `total_sum` table. Every mutation is one SQL statement, so
//! concurrent writers never lose an update.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::domain::{decimal_from_minor_units, AggregateTotal};

use super::StoreError;

/// Primary key of the only row in `total_sum`
const TOTAL_ROW_ID: i64 = 1;

/// Store for the running total
#[derive(Debug, Clone)]
pub struct TotalStore {
    pool: SqlitePool,
}

impl TotalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the total row at zero if it does not exist yet.
    ///
    /// Safe to race: the primary key lets exactly one insert win.
    /// Returns true if this call created the row.
    pub async fn bootstrap(&self) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query(
            r#"
            INSERT INTO total_sum (id, current_total_cents, last_updated)
            VALUES (?1, 0, ?2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(TOTAL_ROW_ID)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected == 1)
    }

    /// Read the total, `None` before bootstrap
    pub async fn read(&self) -> Result<Option<AggregateTotal>, StoreError> {
        let row: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
            "SELECT current_total_cents, last_updated FROM total_sum WHERE id = ?1",
        )
        .bind(TOTAL_ROW_ID)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_aggregate).transpose()
    }

    /// Add `cents` to the total inside the caller's transaction.
    ///
    /// Fails with [`StoreError::TotalOverflow`] instead of letting SQLite
    /// promote the column to REAL once the sum leaves the i64 range.
    pub async fn increment(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        cents: i64,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        // Upsert so a missing row is created with the first amount instead of
        // silently dropping the increment
        let rows_affected = sqlx::query(
            r#"
            INSERT INTO total_sum (id, current_total_cents, last_updated)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (id) DO UPDATE SET
                current_total_cents = current_total_cents + excluded.current_total_cents,
                last_updated = excluded.last_updated
            WHERE current_total_cents <= ?4 - excluded.current_total_cents
            "#,
        )
        .bind(TOTAL_ROW_ID)
        .bind(cents)
        .bind(updated_at)
        .bind(i64::MAX)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::TotalOverflow(cents));
        }

        Ok(())
    }

    /// Set the total to zero. Entries are not touched.
    pub async fn reset(&self) -> Result<AggregateTotal, StoreError> {
        let row: (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO total_sum (id, current_total_cents, last_updated)
            VALUES (?1, 0, ?2)
            ON CONFLICT (id) DO UPDATE SET
                current_total_cents = 0,
                last_updated = excluded.last_updated
            RETURNING current_total_cents, last_updated
            "#,
        )
        .bind(TOTAL_ROW_ID)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        into_aggregate(row)
    }
}

fn into_aggregate((cents, last_updated): (i64, DateTime<Utc>)) -> Result<AggregateTotal, StoreError> {
    if cents < 0 {
        return Err(StoreError::CorruptRow(format!("negative total {cents}")));
    }

    Ok(AggregateTotal {
        current_total: decimal_from_minor_units(cents),
        last_updated,
    })
}
