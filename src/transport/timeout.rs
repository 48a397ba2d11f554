//! Timeout layer for ledger requests.

use super::{Connector, LedgerClient, Result};
use crate::{
    error::LedgerError,
    types::{
        AccountId, AssetId, AssetPair, FeeProjection, LiquidityQuote, SignedTransfer,
        TransferDescriptor,
    },
};
use alloy::primitives::B256;
use async_trait::async_trait;
use std::{future::Future, sync::Arc, time::Duration};
use tracing::warn;
use url::Url;

/// Runs `fut`, failing with [`LedgerError::Timeout`] if it does not complete within `timeout`.
async fn with_timeout<T>(
    endpoint: &Url,
    method: &'static str,
    timeout: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(%endpoint, method, timeout_secs = timeout.as_secs_f64(), "Ledger request timeout");
            Err(LedgerError::Timeout { endpoint: endpoint.clone(), method, timeout })
        }
    }
}

/// A [`Connector`] that bounds connection establishment and every request of the returned
/// clients.
#[derive(Debug, Clone)]
pub struct TimeoutConnector {
    inner: Arc<dyn Connector>,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl TimeoutConnector {
    /// Create a new [`TimeoutConnector`] wrapping `inner`.
    pub fn new(
        inner: Arc<dyn Connector>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self { inner, connect_timeout, request_timeout }
    }
}

#[async_trait]
impl Connector for TimeoutConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn LedgerClient>> {
        let inner =
            with_timeout(endpoint, "connect", self.connect_timeout, self.inner.connect(endpoint))
                .await?;
        Ok(Box::new(TimeoutClient::new(inner, self.request_timeout)))
    }
}

/// A [`LedgerClient`] that wraps another client with a per-request timeout.
#[derive(Debug)]
pub struct TimeoutClient {
    inner: Box<dyn LedgerClient>,
    timeout: Duration,
}

impl TimeoutClient {
    /// Create a new [`TimeoutClient`] with the given timeout duration.
    pub fn new(inner: Box<dyn LedgerClient>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl LedgerClient for TimeoutClient {
    fn endpoint(&self) -> &Url {
        self.inner.endpoint()
    }

    async fn account_nonce(&self, account: AccountId) -> Result<u64> {
        with_timeout(self.endpoint(), "account_nonce", self.timeout, self.inner.account_nonce(account))
            .await
    }

    async fn native_balance(&self, account: AccountId) -> Result<u128> {
        with_timeout(
            self.endpoint(),
            "native_balance",
            self.timeout,
            self.inner.native_balance(account),
        )
        .await
    }

    async fn token_balance(&self, account: AccountId, asset: &AssetId) -> Result<u128> {
        with_timeout(
            self.endpoint(),
            "token_balance",
            self.timeout,
            self.inner.token_balance(account, asset),
        )
        .await
    }

    async fn fee_projection(
        &self,
        transfer: &TransferDescriptor,
        signer: AccountId,
    ) -> Result<FeeProjection> {
        with_timeout(
            self.endpoint(),
            "fee_projection",
            self.timeout,
            self.inner.fee_projection(transfer, signer),
        )
        .await
    }

    async fn liquidity_reserves(&self, pair: &AssetPair) -> Result<LiquidityQuote> {
        with_timeout(
            self.endpoint(),
            "liquidity_reserves",
            self.timeout,
            self.inner.liquidity_reserves(pair),
        )
        .await
    }

    async fn submit_transfer(&self, transfer: &SignedTransfer) -> Result<B256> {
        with_timeout(
            self.endpoint(),
            "submit_transfer",
            self.timeout,
            self.inner.submit_transfer(transfer),
        )
        .await
    }

    async fn disconnect(&self) -> Result<()> {
        with_timeout(self.endpoint(), "disconnect", self.timeout, self.inner.disconnect()).await
    }
}
