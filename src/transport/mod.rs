//! Ledger network transport.
//!
//! A [`LedgerClient`] is one live connection to one ledger network endpoint. A [`Connector`]
//! establishes such connections. Both are external collaborators: implementations speak the
//! ledger's own wire protocol, which this crate does not define.

use crate::{
    error::LedgerError,
    types::{
        AccountId, Asset, AssetId, AssetPair, FeeProjection, LiquidityQuote, SignedTransfer,
        TransferDescriptor,
    },
};
use alloy::primitives::B256;
use async_trait::async_trait;
use std::fmt::Debug;
use url::Url;

mod memory;
pub use memory::{InMemoryConnector, InMemoryLedger};

mod timeout;
pub use timeout::{TimeoutClient, TimeoutConnector};

/// Type alias for `Result<T, LedgerError>`
pub type Result<T> = core::result::Result<T, LedgerError>;

/// One connection to one ledger network endpoint.
#[async_trait]
pub trait LedgerClient: Debug + Send + Sync {
    /// The endpoint this client is connected to.
    fn endpoint(&self) -> &Url;

    /// Returns the node-reported nonce of `account`.
    async fn account_nonce(&self, account: AccountId) -> Result<u64>;

    /// Returns the free native balance of `account`.
    async fn native_balance(&self, account: AccountId) -> Result<u128>;

    /// Returns the free balance of `account` in token `asset`.
    async fn token_balance(&self, account: AccountId, asset: &AssetId) -> Result<u128>;

    /// Projects the fee of `transfer` if signed by `signer`.
    async fn fee_projection(
        &self,
        transfer: &TransferDescriptor,
        signer: AccountId,
    ) -> Result<FeeProjection>;

    /// Returns the liquidity pool reserves of `pair`.
    async fn liquidity_reserves(&self, pair: &AssetPair) -> Result<LiquidityQuote>;

    /// Submits a signed transfer, returning its transaction hash.
    async fn submit_transfer(&self, transfer: &SignedTransfer) -> Result<B256>;

    /// Tears down the connection.
    async fn disconnect(&self) -> Result<()>;

    /// Returns the free balance of `account` in `asset`, native or token.
    async fn balance(&self, account: AccountId, asset: &Asset) -> Result<u128> {
        if asset.is_native() {
            self.native_balance(account).await
        } else {
            self.token_balance(account, &asset.id).await
        }
    }
}

/// Establishes connections to ledger network endpoints.
#[async_trait]
pub trait Connector: Debug + Send + Sync {
    /// Connects to `endpoint`. Includes the handshake and any metadata sync.
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn LedgerClient>>;
}
