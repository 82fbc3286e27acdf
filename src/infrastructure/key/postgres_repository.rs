//! PostgreSQL key record repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use crate::domain::key::{ClientAddr, KeyRecord, KeyRecordRepository};
use crate::domain::DomainError;

/// PostgreSQL implementation of KeyRecordRepository
///
/// One row per address in the `ip_keys` table; the primary key on
/// `address` plus `INSERT .. ON CONFLICT DO UPDATE` keeps upserts atomic.
#[derive(Debug, Clone)]
pub struct PostgresKeyRecordRepository {
    pool: PgPool,
}

impl PostgresKeyRecordRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `url`
    pub async fn connect(url: &str) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e))
            })?;

        Ok(Self::new(pool))
    }

    /// Ensures the key table exists
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ip_keys (
                address VARCHAR(64) PRIMARY KEY,
                key TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create ip_keys table: {}", e)))?;

        Ok(())
    }
}

fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<KeyRecord, DomainError> {
    let address: String = row.get("address");
    let key: String = row.get("key");
    let created_at: DateTime<Utc> = row.get("created_at");

    let address = ClientAddr::new(address)
        .map_err(|e| DomainError::storage(format!("Invalid stored address: {}", e)))?;

    Ok(KeyRecord::new(address, key).with_created_at(created_at))
}

#[async_trait]
impl KeyRecordRepository for PostgresKeyRecordRepository {
    async fn get(&self, address: &ClientAddr) -> Result<Option<KeyRecord>, DomainError> {
        let row = sqlx::query("SELECT address, key, created_at FROM ip_keys WHERE address = $1")
            .bind(address.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get key record: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, record: KeyRecord) -> Result<KeyRecord, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO ip_keys (address, key, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (address)
            DO UPDATE SET key = EXCLUDED.key, created_at = EXCLUDED.created_at
            "#,
        )
        .bind(record.address().as_str())
        .bind(record.key())
        .bind(record.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to upsert key record: {}", e)))?;

        Ok(record)
    }

    async fn delete(&self, address: &ClientAddr) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM ip_keys WHERE address = $1")
            .bind(address.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete key record: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<KeyRecord>, DomainError> {
        let rows = sqlx::query("SELECT address, key, created_at FROM ip_keys")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list key records: {}", e)))?;

        let mut records = Vec::with_capacity(rows.len());

        for row in &rows {
            records.push(row_to_record(row)?);
        }

        Ok(records)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM ip_keys")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count key records: {}", e)))?;

        let total: i64 = row.get("total");
        Ok(total as usize)
    }
}
