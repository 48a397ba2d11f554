//! Dispatch error types.
use crate::types::AssetId;
use thiserror::Error;

mod ledger;
pub use ledger::LedgerError;

mod pricing;
pub use pricing::PricingError;

mod reward;
pub use reward::{RewardError, RewardStage};

mod storage;
pub use storage::StorageError;

/// The overarching error type of a dispatch workflow.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The asset is not in the registry, or has no reward program.
    ///
    /// Surfaced to the caller as a rejected request.
    #[error("unsupported asset {0}")]
    UnsupportedAsset(AssetId),
    /// Errors talking to a ledger network, including timeouts.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// Errors related to fee estimation.
    #[error(transparent)]
    Pricing(#[from] PricingError),
    /// Errors related to storage.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A reward dispatch failed at the contained stage.
    #[error(transparent)]
    Reward(Box<RewardError>),
    /// Signing a transfer failed.
    #[error(transparent)]
    Signer(#[from] alloy::signers::Error),
    /// An amount could not be scaled to the asset's precision.
    #[error(transparent)]
    Amount(#[from] AmountError),
    /// An internal error occurred.
    #[error(transparent)]
    Internal(#[from] eyre::Error),
}

impl From<RewardError> for DispatchError {
    fn from(err: RewardError) -> Self {
        Self::Reward(Box::new(err))
    }
}

/// Errors converting between raw and human amounts.
#[derive(Debug, Error)]
pub enum AmountError {
    /// The asset precision exceeds what a decimal can represent.
    #[error("{decimals} decimals exceed the supported precision")]
    Precision {
        /// The offending precision.
        decimals: u8,
    },
    /// The amount does not fit the asset's precision.
    #[error("amount {0} is out of range")]
    OutOfRange(String),
}
