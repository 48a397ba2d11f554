//! Dispatch storage api.

use crate::{
    error::StorageError,
    nonce::NonceKey,
    types::{AccountId, AccountRecord, TransactionRecord},
};
use async_trait::async_trait;
use std::fmt::Debug;

/// Type alias for `Result<T, StorageError>`
pub type Result<T> = core::result::Result<T, StorageError>;

/// Storage API.
#[async_trait]
pub trait StorageApi: Debug + Send + Sync {
    /// Allocates a nonce for `key` given the node-reported `observed` nonce.
    ///
    /// Creates the counter at `observed + 1` if it does not exist and returns `observed`.
    /// Otherwise assigns `max(counter, observed)` and advances the counter past it. The
    /// read-modify-write must be atomic per key.
    async fn get_and_advance_nonce(&self, key: &NonceKey, observed: u64) -> Result<u64>;

    /// Reads the next available nonce for `key`, if a counter exists.
    async fn read_nonce(&self, key: &NonceKey) -> Result<Option<u64>>;

    /// Appends a completed transfer.
    async fn append_transaction(&self, record: &TransactionRecord) -> Result<()>;

    /// Reads all transfers sent from or to `account`, oldest first.
    async fn read_transactions(&self, account: AccountId) -> Result<Vec<TransactionRecord>>;

    /// Creates a placeholder identity for `id` unless one exists.
    ///
    /// Returns `true` if a record was created.
    async fn ensure_account(&self, id: AccountId, display_name: &str) -> Result<bool>;

    /// Reads the identity of `id`, if any.
    async fn read_account(&self, id: AccountId) -> Result<Option<AccountRecord>>;
}
