//! Reward dispatching.
//!
//! Rewards are fixed-amount transfers from a faucet signer shared by every concurrent dispatch.
//! The node-reported nonce of that signer lags behind transfers still in flight, so every dispatch
//! allocates its nonce from the [`NonceSequencer`] and submits with it explicitly.

use crate::{
    connection::ConnectionManager,
    error::{RewardError, RewardStage},
    metrics::RewardMetrics,
    nonce::{NonceKey, NonceSequencer},
    signers::DynSigner,
    storage::{DispatchStorage, StorageApi},
    transport::Connector,
    types::{AccountId, Asset, TransactionRecord, TransferIntent},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Dispatches rewards in one asset from the faucet signer.
#[derive(Debug, Clone)]
pub struct RewardDispatcher {
    asset: Asset,
    faucet: DynSigner,
    connector: Arc<dyn Connector>,
    storage: DispatchStorage,
    sequencer: NonceSequencer,
    placeholder_name: String,
    metrics: Arc<RewardMetrics>,
}

impl RewardDispatcher {
    /// Create a new [`RewardDispatcher`] paying rewards in `asset`.
    ///
    /// Dispatchers sharing a faucet signer must share `sequencer`.
    pub fn new(
        asset: Asset,
        faucet: DynSigner,
        connector: Arc<dyn Connector>,
        storage: DispatchStorage,
        sequencer: NonceSequencer,
        placeholder_name: impl Into<String>,
    ) -> Self {
        Self {
            asset,
            faucet,
            connector,
            storage,
            sequencer,
            placeholder_name: placeholder_name.into(),
            metrics: Arc::new(RewardMetrics::default()),
        }
    }

    /// The asset rewards are paid in.
    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    /// Transfers `amount` raw units from the faucet to `to`.
    ///
    /// Creates a placeholder identity for `to` if it is not known yet. Every error is returned
    /// with the stage it happened in; the connection is released either way.
    #[instrument(skip(self), fields(asset = %self.asset.id))]
    pub async fn dispatch(
        &self,
        to: AccountId,
        amount: u128,
    ) -> Result<TransactionRecord, RewardError> {
        let mut connections = ConnectionManager::new(self.connector.clone());
        let result = self.dispatch_with(&mut connections, to, amount).await;
        connections.release().await;

        match &result {
            Ok(_) => self.metrics.dispatched.increment(1),
            Err(_) => self.metrics.failed.increment(1),
        }

        result
    }

    async fn dispatch_with(
        &self,
        connections: &mut ConnectionManager,
        to: AccountId,
        amount: u128,
    ) -> Result<TransactionRecord, RewardError> {
        let client = connections
            .acquire(&self.asset.endpoint)
            .await
            .map_err(RewardError::at(RewardStage::Connect))?;

        let from = self.faucet.address();
        let observed =
            client.account_nonce(from).await.map_err(RewardError::at(RewardStage::QueryNonce))?;
        let nonce = self
            .sequencer
            .allocate(&NonceKey::new(self.asset.id.clone(), from), observed)
            .await
            .map_err(RewardError::at(RewardStage::AllocateNonce))?;

        let intent = TransferIntent::new(self.asset.clone(), from, to, amount);
        let transfer = self
            .faucet
            .sign_transfer(intent.descriptor(), Some(nonce))
            .await
            .map_err(RewardError::at(RewardStage::Sign))?;
        let hash = client
            .submit_transfer(&transfer)
            .await
            .map_err(RewardError::at(RewardStage::Submit))?;
        info!(%to, %hash, nonce, "Dispatched reward");

        if self
            .storage
            .ensure_account(to, &self.placeholder_name)
            .await
            .map_err(RewardError::at(RewardStage::RegisterAccount))?
        {
            debug!(%to, "Created placeholder identity");
            self.metrics.accounts_created.increment(1);
        }

        let record = TransactionRecord {
            hash,
            asset: self.asset.id.clone(),
            from,
            to,
            amount: self.asset.to_human(amount).map_err(RewardError::at(RewardStage::Record))?,
            nonce: Some(nonce),
            created_at: Utc::now(),
        };
        self.storage
            .append_transaction(&record)
            .await
            .map_err(RewardError::at(RewardStage::Record))?;

        Ok(record)
    }
}
