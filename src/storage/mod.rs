//! Dispatch storage

mod api;
pub use api::StorageApi;
mod memory;
mod pg;

use crate::{
    nonce::NonceKey,
    types::{AccountId, AccountRecord, TransactionRecord},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// Dispatch storage interface.
#[derive(Debug, Clone)]
pub struct DispatchStorage {
    inner: Arc<dyn StorageApi>,
}

impl DispatchStorage {
    /// Create [`DispatchStorage`] with a in-memory backend.
    pub fn in_memory() -> Self {
        Self { inner: Arc::new(memory::InMemoryStorage::default()) }
    }

    /// Create [`DispatchStorage`] with a PostgreSQL backend.
    ///
    /// Migrations are expected to have been applied, see [`DispatchStorage::migrate`].
    pub fn pg(pool: PgPool) -> Self {
        Self { inner: Arc::new(pg::PgStorage::new(pool)) }
    }

    /// Applies the embedded migrations to `pool`.
    pub async fn migrate(pool: &PgPool) -> eyre::Result<()> {
        sqlx::migrate!().run(pool).await?;
        Ok(())
    }
}

#[async_trait]
impl StorageApi for DispatchStorage {
    async fn get_and_advance_nonce(&self, key: &NonceKey, observed: u64) -> api::Result<u64> {
        self.inner.get_and_advance_nonce(key, observed).await
    }

    async fn read_nonce(&self, key: &NonceKey) -> api::Result<Option<u64>> {
        self.inner.read_nonce(key).await
    }

    async fn append_transaction(&self, record: &TransactionRecord) -> api::Result<()> {
        self.inner.append_transaction(record).await
    }

    async fn read_transactions(&self, account: AccountId) -> api::Result<Vec<TransactionRecord>> {
        self.inner.read_transactions(account).await
    }

    async fn ensure_account(&self, id: AccountId, display_name: &str) -> api::Result<bool> {
        self.inner.ensure_account(id, display_name).await
    }

    async fn read_account(&self, id: AccountId) -> api::Result<Option<AccountRecord>> {
        self.inner.read_account(id).await
    }
}
