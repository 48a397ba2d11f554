use super::DispatchError;
use derive_more::Display;

/// The step of a reward dispatch that failed.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum RewardStage {
    /// Connecting to the reward asset's endpoint.
    #[display("connecting")]
    Connect,
    /// Querying the faucet's node-reported nonce.
    #[display("querying nonce")]
    QueryNonce,
    /// Allocating a nonce from the sequencer.
    #[display("allocating nonce")]
    AllocateNonce,
    /// Signing the transfer.
    #[display("signing")]
    Sign,
    /// Submitting the signed transfer.
    #[display("submitting")]
    Submit,
    /// Registering the recipient's placeholder identity.
    #[display("registering recipient")]
    RegisterAccount,
    /// Writing the transaction record.
    #[display("recording")]
    Record,
}

/// A failed reward dispatch: the underlying error and the stage it happened in.
#[derive(Debug, thiserror::Error)]
#[error("reward dispatch failed while {stage}: {source}")]
pub struct RewardError {
    /// Where the dispatch failed.
    pub stage: RewardStage,
    /// The underlying error.
    pub source: DispatchError,
}

impl RewardError {
    /// Wraps `source` with the stage it happened in.
    pub fn new(stage: RewardStage, source: impl Into<DispatchError>) -> Self {
        Self { stage, source: source.into() }
    }

    /// Returns a closure wrapping errors with `stage`, for use with `map_err`.
    pub fn at<E: Into<DispatchError>>(stage: RewardStage) -> impl FnOnce(E) -> Self {
        move |err| Self::new(stage, err)
    }
}
