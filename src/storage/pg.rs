//! Dispatch storage implementation using a PostgreSQL database.

use super::{StorageApi, api::Result};
use crate::{
    error::StorageError,
    nonce::NonceKey,
    types::{AccountId, AccountRecord, AssetId, TransactionRecord},
};
use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

/// A row of the `transactions` table.
type TransactionRow = (Vec<u8>, String, Vec<u8>, Vec<u8>, Decimal, Option<i64>, DateTime<Utc>);

/// PostgreSQL storage implementation.
#[derive(Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Creates a new PostgreSQL storage instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StorageApi for PgStorage {
    #[instrument(skip(self, key), fields(asset = %key.asset, signer = %key.signer))]
    async fn get_and_advance_nonce(&self, key: &NonceKey, observed: u64) -> Result<u64> {
        let observed = counter(observed)?;

        // The conflicting row is locked for the duration of the upsert, so concurrent
        // allocations for the same key are serialized by the database.
        let (assigned,): (i64,) = sqlx::query_as(
            r#"
            insert into nonces (asset, signer, next_nonce)
            values ($1, $2, $3 + 1)
            on conflict (asset, signer) do update
            set next_nonce = greatest(nonces.next_nonce, $3) + 1
            returning next_nonce - 1
            "#,
        )
        .bind(key.asset.as_str())
        .bind(key.signer.as_slice())
        .bind(observed)
        .fetch_one(&self.pool)
        .await
        .map_err(eyre::Error::from)?;

        u64::try_from(assigned).map_err(|_| StorageError::Corrupt("next_nonce"))
    }

    #[instrument(skip(self, key), fields(asset = %key.asset, signer = %key.signer))]
    async fn read_nonce(&self, key: &NonceKey) -> Result<Option<u64>> {
        let row: Option<(i64,)> =
            sqlx::query_as("select next_nonce from nonces where asset = $1 and signer = $2")
                .bind(key.asset.as_str())
                .bind(key.signer.as_slice())
                .fetch_optional(&self.pool)
                .await
                .map_err(eyre::Error::from)?;

        row.map(|(next,)| u64::try_from(next).map_err(|_| StorageError::Corrupt("next_nonce")))
            .transpose()
    }

    #[instrument(skip_all, fields(hash = %record.hash))]
    async fn append_transaction(&self, record: &TransactionRecord) -> Result<()> {
        let nonce = record
            .nonce
            .map(|nonce| i64::try_from(nonce).map_err(|_| StorageError::NonceOutOfRange(nonce)))
            .transpose()?;

        sqlx::query(
            "insert into transactions (hash, asset, from_account, to_account, amount, nonce, created_at) values ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.hash.as_slice())
        .bind(record.asset.as_str())
        .bind(record.from.as_slice())
        .bind(record.to.as_slice())
        .bind(record.amount)
        .bind(nonce)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(eyre::Error::from)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn read_transactions(&self, account: AccountId) -> Result<Vec<TransactionRecord>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            select hash, asset, from_account, to_account, amount, nonce, created_at
            from transactions
            where from_account = $1 or to_account = $1
            order by created_at
            "#,
        )
        .bind(account.as_slice())
        .fetch_all(&self.pool)
        .await
        .map_err(eyre::Error::from)?;

        rows.into_iter()
            .map(|(hash, asset, from, to, amount, nonce, created_at)| {
                Ok(TransactionRecord {
                    hash: B256::try_from(hash.as_slice())
                        .map_err(|_| StorageError::Corrupt("hash"))?,
                    asset: AssetId::new(asset),
                    from: Address::try_from(from.as_slice())
                        .map_err(|_| StorageError::Corrupt("from_account"))?,
                    to: Address::try_from(to.as_slice())
                        .map_err(|_| StorageError::Corrupt("to_account"))?,
                    amount,
                    nonce: nonce
                        .map(u64::try_from)
                        .transpose()
                        .map_err(|_| StorageError::Corrupt("nonce"))?,
                    created_at,
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn ensure_account(&self, id: AccountId, display_name: &str) -> Result<bool> {
        let result = sqlx::query(
            "insert into accounts (id, display_name, created_at) values ($1, $2, $3) on conflict (id) do nothing",
        )
        .bind(id.as_slice())
        .bind(display_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(eyre::Error::from)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn read_account(&self, id: AccountId) -> Result<Option<AccountRecord>> {
        let row: Option<(String, DateTime<Utc>)> =
            sqlx::query_as("select display_name, created_at from accounts where id = $1")
                .bind(id.as_slice())
                .fetch_optional(&self.pool)
                .await
                .map_err(eyre::Error::from)?;

        Ok(row.map(|(display_name, created_at)| AccountRecord { id, display_name, created_at }))
    }
}

/// Converts an observed nonce to the `bigint` counter, leaving room for the increment.
fn counter(nonce: u64) -> Result<i64> {
    i64::try_from(nonce)
        .ok()
        .filter(|nonce| *nonce < i64::MAX)
        .ok_or(StorageError::NonceOutOfRange(nonce))
}
