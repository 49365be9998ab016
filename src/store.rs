//! The rate cache.
//!
//! The conversion service only sees [`RateStore`]. Entries are raw provider payloads keyed by
//! [`cache_key`](crate::cache_key::cache_key); `get` decodes them, `set` stores bytes verbatim.

use async_trait::async_trait;
use log::*;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{error::StoreError, rates::RateTable};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[async_trait]
pub trait RateStore: Send + Sync {
    /// Loads the rate table cached under `key`. A missing entry is [`StoreError::NotFound`].
    async fn get(&self, key: &[u8]) -> Result<RateTable, StoreError>;
    /// Stores `payload` under `key`. An existing entry for the key is left untouched.
    async fn set(&self, key: &[u8], payload: &[u8]) -> Result<(), StoreError>;
}

/// Postgres backed rate cache. The pool is shared, so concurrent requests may read and write
/// freely.
#[derive(Clone)]
pub struct PgRateStore {
    pool: PgPool,
}

impl PgRateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .connect(url)
            .await?;
        debug!("Connected to rate cache database");
        Ok(Self::new(pool))
    }

    /// Creates the cache table if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rate_cache (
                key BYTEA PRIMARY KEY,
                payload BYTEA NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RateStore for PgRateStore {
    async fn get(&self, key: &[u8]) -> Result<RateTable, StoreError> {
        let payload: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT payload FROM rate_cache WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        let payload = payload.ok_or(StoreError::NotFound)?;
        Ok(RateTable::from_slice(&payload)?)
    }

    async fn set(&self, key: &[u8], payload: &[u8]) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO rate_cache (key, payload) VALUES ($1, $2) ON CONFLICT (key) DO NOTHING",
        )
        .bind(key)
        .bind(payload)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            debug!("Rate cache already had an entry for {}", String::from_utf8_lossy(key));
        }
        Ok(())
    }
}
