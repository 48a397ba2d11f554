//! Batch claim processing.
//!
//! Moves every claimable balance held by a beneficiary's custodial signer to the beneficiary,
//! net of the transfer fee. Assets are processed one after another over a single
//! [`ConnectionManager`]; a failure on one asset is logged and the batch moves on.

use crate::{
    connection::ConnectionManager,
    error::DispatchError,
    metrics::ClaimMetrics,
    pricing::FeeEstimator,
    signers::DynSigner,
    storage::{DispatchStorage, StorageApi},
    transport::Connector,
    types::{AccountId, Asset, AssetId, TransactionRecord, TransferIntent},
};
use chrono::Utc;
use derive_more::Display;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Why an asset was passed over without a transfer. None of these are errors.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The asset is the designated reward asset, which is never claimed.
    #[display("reward asset")]
    RewardAsset,
    /// The signer holds none of the asset.
    #[display("no balance")]
    NoBalance,
    /// The balance does not cover the fee.
    #[display("balance {balance} does not cover fee {fee}")]
    InsufficientBalance {
        /// Balance in raw units.
        balance: u128,
        /// Estimated fee in raw units.
        fee: u128,
    },
}

/// Outcome of a batch claim.
#[derive(Debug, Default)]
pub struct ClaimReport {
    /// Records of the transfers made, in processing order.
    pub claimed: Vec<TransactionRecord>,
    /// Assets passed over without a transfer.
    pub skipped: Vec<(AssetId, SkipReason)>,
    /// Assets whose claim failed, with the error.
    pub failed: Vec<(AssetId, String)>,
}

#[derive(Debug)]
enum Claim {
    Transferred(TransactionRecord),
    Skipped(SkipReason),
}

/// Runs batch claims for beneficiaries.
///
/// Claims for different beneficiaries may run concurrently: each call owns its connection and
/// uses the beneficiary's own signer, so no nonce sequencing is involved.
#[derive(Debug, Clone)]
pub struct ClaimProcessor {
    connector: Arc<dyn Connector>,
    storage: DispatchStorage,
    /// The designated reward asset, excluded from claims.
    reward_asset: Option<AssetId>,
    metrics: Arc<ClaimMetrics>,
}

impl ClaimProcessor {
    /// Create a new [`ClaimProcessor`].
    pub fn new(connector: Arc<dyn Connector>, storage: DispatchStorage) -> Self {
        Self {
            connector,
            storage,
            reward_asset: None,
            metrics: Arc::new(ClaimMetrics::default()),
        }
    }

    /// Excludes `asset` from claims.
    pub fn with_reward_asset(mut self, asset: AssetId) -> Self {
        self.reward_asset = Some(asset);
        self
    }

    /// Claims every asset in `assets` held by `signer` on behalf of `beneficiary`.
    ///
    /// Never fails: per-asset errors are logged and reported in [`ClaimReport::failed`].
    #[instrument(skip_all, fields(%beneficiary, signer = %signer.address()))]
    pub async fn claim_all(
        &self,
        beneficiary: AccountId,
        signer: &DynSigner,
        assets: &[Asset],
    ) -> ClaimReport {
        let mut connections = ConnectionManager::new(self.connector.clone());
        let mut report = ClaimReport::default();

        for asset in assets {
            let claim = if self.reward_asset.as_ref() == Some(&asset.id) {
                Ok(Claim::Skipped(SkipReason::RewardAsset))
            } else {
                self.claim_asset(&mut connections, beneficiary, signer, asset).await
            };

            match claim {
                Ok(Claim::Transferred(record)) => {
                    self.metrics.claimed.increment(1);
                    report.claimed.push(record);
                }
                Ok(Claim::Skipped(reason)) => {
                    debug!(asset = %asset.id, %reason, "Skipping asset");
                    self.metrics.skipped.increment(1);
                    report.skipped.push((asset.id.clone(), reason));
                }
                Err(err) => {
                    warn!(
                        asset = %asset.id,
                        endpoint = %asset.endpoint,
                        %err,
                        "Failed to claim asset"
                    );
                    self.metrics.failed.increment(1);
                    report.failed.push((asset.id.clone(), err.to_string()));
                }
            }
        }

        connections.release().await;

        report
    }

    async fn claim_asset(
        &self,
        connections: &mut ConnectionManager,
        beneficiary: AccountId,
        signer: &DynSigner,
        asset: &Asset,
    ) -> Result<Claim, DispatchError> {
        let client = connections.acquire(&asset.endpoint).await?;

        let balance = client.balance(signer.address(), asset).await?;
        if balance == 0 {
            return Ok(Claim::Skipped(SkipReason::NoBalance));
        }

        let intent = TransferIntent::new(asset.clone(), signer.address(), beneficiary, balance);
        let fee = FeeEstimator::new(&**client).estimate(&intent).await?;
        let Some(intent) = intent.net_of_fee(fee) else {
            return Ok(Claim::Skipped(SkipReason::InsufficientBalance { balance, fee }));
        };

        let transfer = signer.sign_transfer(intent.descriptor(), None).await?;
        let hash = client.submit_transfer(&transfer).await?;

        let record = TransactionRecord {
            hash,
            asset: asset.id.clone(),
            from: intent.from,
            to: intent.to,
            amount: asset.to_human(intent.amount)?,
            nonce: None,
            created_at: Utc::now(),
        };
        self.storage.append_transaction(&record).await?;

        info!(asset = %asset.id, %hash, amount = %record.amount, fee, "Claimed asset");

        Ok(Claim::Transferred(record))
    }
}
