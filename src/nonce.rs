//! Nonce management module.
//!
//! A ledger node reports the nonce of a signer as of its confirmed state, which lags behind
//! transfers this process already submitted. The [`NonceSequencer`] keeps a persisted counter per
//! asset and signer that is the authoritative next available nonce and never regresses.

use crate::{
    error::StorageError,
    metrics::NonceMetrics,
    storage::{DispatchStorage, StorageApi},
    types::{AccountId, AssetId},
};
use dashmap::DashMap;
use futures_util::lock::Mutex;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tracing::{debug, instrument};

/// Key of a nonce counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonceKey {
    /// The asset transfers are made in.
    pub asset: AssetId,
    /// The signer the sequence belongs to.
    pub signer: AccountId,
}

impl NonceKey {
    /// Create a new key.
    pub fn new(asset: AssetId, signer: AccountId) -> Self {
        Self { asset, signer }
    }
}

/// Returns the nonce to assign given the `stored` counter, if any, and the node-reported
/// `observed` nonce.
///
/// The counter wins unless the node has advanced past it, e.g. after a transfer submitted
/// elsewhere.
pub fn assign_nonce(stored: Option<u64>, observed: u64) -> u64 {
    stored.map_or(observed, |stored| stored.max(observed))
}

/// [`NonceSequencer`] assigns gap-free, increasing nonces per asset and signer.
///
/// Allocations for the same key are single-flight within the process; the storage backend makes
/// each allocation atomic across processes. Allocations for different keys do not block each
/// other.
#[derive(Clone)]
pub struct NonceSequencer {
    storage: DispatchStorage,
    #[allow(clippy::type_complexity)]
    locks: Arc<DashMap<NonceKey, Arc<Mutex<()>>>>,
    metrics: Arc<NonceMetrics>,
}

impl fmt::Debug for NonceSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonceSequencer").field("keys", &self.locks.len()).finish_non_exhaustive()
    }
}

impl NonceSequencer {
    /// Create a new [`NonceSequencer`] backed by `storage`.
    pub fn new(storage: DispatchStorage) -> Self {
        Self { storage, locks: Default::default(), metrics: Arc::new(NonceMetrics::default()) }
    }

    /// Allocates the nonce for the next transfer of `key`, given the node-reported `observed`
    /// nonce.
    #[instrument(skip(self, key), fields(asset = %key.asset, signer = %key.signer))]
    pub async fn allocate(&self, key: &NonceKey, observed: u64) -> Result<u64, StorageError> {
        // Locks dashmap internally for a short duration to clone the `Arc`.
        // We also don't want to hold the dashmap lock through the await point below.
        let lock = {
            let rm = self.locks.entry(key.clone()).or_insert_with(|| Arc::new(Mutex::new(())));
            Arc::clone(rm.value())
        };

        let _guard = lock.lock().await;
        let assigned = self.storage.get_and_advance_nonce(key, observed).await?;

        if assigned > observed {
            self.metrics.stale_observed.increment(1);
            debug!(assigned, "Node-reported nonce is behind the sequence");
        }
        self.metrics.allocated.increment(1);

        Ok(assigned)
    }
}
