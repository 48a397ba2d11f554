//! Dispatch storage implementation in-memory.

use super::{StorageApi, api::Result};
use crate::{
    error::StorageError,
    nonce::{NonceKey, assign_nonce},
    types::{AccountId, AccountRecord, TransactionRecord},
};
use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use tokio::sync::RwLock;

/// [`StorageApi`] implementation in-memory.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    nonces: DashMap<NonceKey, u64>,
    transactions: RwLock<Vec<TransactionRecord>>,
    accounts: DashMap<AccountId, AccountRecord>,
}

#[async_trait]
impl StorageApi for InMemoryStorage {
    async fn get_and_advance_nonce(&self, key: &NonceKey, observed: u64) -> Result<u64> {
        // The entry holds the shard lock until it is dropped, which makes the update atomic.
        match self.nonces.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let assigned = assign_nonce(Some(*entry.get()), observed);
                entry.insert(next_after(assigned)?);
                Ok(assigned)
            }
            Entry::Vacant(entry) => {
                entry.insert(next_after(observed)?);
                Ok(observed)
            }
        }
    }

    async fn read_nonce(&self, key: &NonceKey) -> Result<Option<u64>> {
        Ok(self.nonces.get(key).map(|next| *next))
    }

    async fn append_transaction(&self, record: &TransactionRecord) -> Result<()> {
        self.transactions.write().await.push(record.clone());
        Ok(())
    }

    async fn read_transactions(&self, account: AccountId) -> Result<Vec<TransactionRecord>> {
        Ok(self
            .transactions
            .read()
            .await
            .iter()
            .filter(|record| record.from == account || record.to == account)
            .cloned()
            .collect())
    }

    async fn ensure_account(&self, id: AccountId, display_name: &str) -> Result<bool> {
        match self.accounts.entry(id) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(AccountRecord::new(id, display_name));
                Ok(true)
            }
        }
    }

    async fn read_account(&self, id: AccountId) -> Result<Option<AccountRecord>> {
        Ok(self.accounts.get(&id).map(|account| account.clone()))
    }
}

fn next_after(nonce: u64) -> Result<u64> {
    nonce.checked_add(1).ok_or(StorageError::NonceOutOfRange(nonce))
}
