//! Ledger implementation in-memory. For testing only.

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
use parking_lot::Mutex;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};
use url::Url;

#[derive(Debug, Default)]
struct LedgerState {
    native: HashMap<AccountId, u128>,
    tokens: HashMap<(AccountId, AssetId), u128>,
    /// Node-reported nonce per account.
    nonces: HashMap<AccountId, u64>,
    used_nonces: HashSet<(AccountId, u64)>,
    /// Node-reported nonces stay put on submission, as if nothing was confirmed yet.
    frozen_nonces: bool,
    native_fee: FeeProjection,
    token_fee: FeeProjection,
    pools: HashMap<AssetPair, LiquidityQuote>,
    submitted: Vec<SignedTransfer>,
    connect_error: Option<String>,
    latency: Duration,
    connect_latency: Duration,
    connections: usize,
    disconnections: usize,
}

impl LedgerState {
    fn balance_mut(&mut self, account: AccountId, transfer: &TransferDescriptor) -> &mut u128 {
        if transfer.native {
            self.native.entry(account).or_default()
        } else {
            self.tokens.entry((account, transfer.asset.clone())).or_default()
        }
    }

    fn next_free_nonce(&self, account: AccountId) -> u64 {
        let mut nonce = self.nonces.get(&account).copied().unwrap_or_default();
        while self.used_nonces.contains(&(account, nonce)) {
            nonce += 1;
        }
        nonce
    }

    fn apply(&mut self, transfer: &SignedTransfer) -> Result<B256> {
        let recovered = transfer
            .recover_signer()
            .map_err(|err| LedgerError::Rejected(format!("invalid signature: {err}")))?;
        if recovered != transfer.signer {
            return Err(LedgerError::Rejected(format!("bad signature for {}", transfer.signer)));
        }

        let reported = self.nonces.get(&transfer.signer).copied().unwrap_or_default();
        let nonce = match transfer.nonce {
            Some(nonce) if nonce < reported || self.used_nonces.contains(&(transfer.signer, nonce)) => {
                return Err(LedgerError::Rejected(format!("stale nonce {nonce}")));
            }
            Some(nonce) => nonce,
            None => self.next_free_nonce(transfer.signer),
        };

        let descriptor = &transfer.descriptor;
        let source = self.balance_mut(transfer.signer, descriptor);
        *source = source
            .checked_sub(descriptor.amount)
            .ok_or_else(|| LedgerError::Rejected("insufficient balance".to_string()))?;
        *self.balance_mut(descriptor.to, descriptor) += descriptor.amount;

        self.used_nonces.insert((transfer.signer, nonce));
        if !self.frozen_nonces {
            self.nonces.insert(transfer.signer, reported.max(nonce + 1));
        }
        self.submitted.push(transfer.clone());

        Ok(transfer.hash())
    }
}

/// A ledger network held in memory. Cloning returns a handle to the same network.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    endpoint: Url,
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedger {
    /// Create an empty ledger served at `endpoint`.
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint, state: Default::default() }
    }

    /// Sets the native balance of `account`.
    pub fn set_native_balance(&self, account: AccountId, balance: u128) {
        self.state.lock().native.insert(account, balance);
    }

    /// Sets the balance of `account` in token `asset`.
    pub fn set_token_balance(&self, account: AccountId, asset: impl Into<AssetId>, balance: u128) {
        self.state.lock().tokens.insert((account, asset.into()), balance);
    }

    /// Sets the node-reported nonce of `account`.
    pub fn set_account_nonce(&self, account: AccountId, nonce: u64) {
        self.state.lock().nonces.insert(account, nonce);
    }

    /// Stops node-reported nonces from advancing on submission.
    pub fn freeze_nonces(&self) {
        self.state.lock().frozen_nonces = true;
    }

    /// Sets the fee projection returned for native transfers.
    pub fn set_native_fee(&self, fee: FeeProjection) {
        self.state.lock().native_fee = fee;
    }

    /// Sets the fee projection, in the reference asset, returned for token transfers.
    pub fn set_token_fee(&self, fee: FeeProjection) {
        self.state.lock().token_fee = fee;
    }

    /// Sets the reserves of a liquidity pool.
    pub fn set_pool(&self, pair: AssetPair, quote: LiquidityQuote) {
        self.state.lock().pools.insert(pair, quote);
    }

    /// Makes every subsequent connection attempt fail with `reason`.
    pub fn fail_connections(&self, reason: impl Into<String>) {
        self.state.lock().connect_error = Some(reason.into());
    }

    /// Delays every request by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().latency = latency;
    }

    /// Delays every connection attempt by `latency`.
    pub fn set_connect_latency(&self, latency: Duration) {
        self.state.lock().connect_latency = latency;
    }

    /// Returns the native balance of `account`.
    pub fn native_balance_of(&self, account: AccountId) -> u128 {
        self.state.lock().native.get(&account).copied().unwrap_or_default()
    }

    /// Returns the balance of `account` in token `asset`.
    pub fn token_balance_of(&self, account: AccountId, asset: &AssetId) -> u128 {
        self.state.lock().tokens.get(&(account, asset.clone())).copied().unwrap_or_default()
    }

    /// Returns all accepted transfers, in submission order.
    pub fn submitted(&self) -> Vec<SignedTransfer> {
        self.state.lock().submitted.clone()
    }

    /// Number of connections established so far.
    pub fn connections(&self) -> usize {
        self.state.lock().connections
    }

    /// Number of connections torn down so far.
    pub fn disconnections(&self) -> usize {
        self.state.lock().disconnections
    }

    async fn delay(&self) {
        let latency = self.state.lock().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    async fn open(&self) -> Result<Self> {
        let latency = self.state.lock().connect_latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.lock();
        if let Some(reason) = &state.connect_error {
            return Err(LedgerError::Connect { endpoint: self.endpoint.clone(), reason: reason.clone() });
        }
        state.connections += 1;
        Ok(self.clone())
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn account_nonce(&self, account: AccountId) -> Result<u64> {
        self.delay().await;
        Ok(self.state.lock().nonces.get(&account).copied().unwrap_or_default())
    }

    async fn native_balance(&self, account: AccountId) -> Result<u128> {
        self.delay().await;
        Ok(self.native_balance_of(account))
    }

    async fn token_balance(&self, account: AccountId, asset: &AssetId) -> Result<u128> {
        self.delay().await;
        Ok(self.token_balance_of(account, asset))
    }

    async fn fee_projection(
        &self,
        transfer: &TransferDescriptor,
        _signer: AccountId,
    ) -> Result<FeeProjection> {
        self.delay().await;
        let state = self.state.lock();
        Ok(if transfer.native { state.native_fee } else { state.token_fee })
    }

    async fn liquidity_reserves(&self, pair: &AssetPair) -> Result<LiquidityQuote> {
        self.delay().await;
        self.state
            .lock()
            .pools
            .get(pair)
            .copied()
            .ok_or_else(|| LedgerError::Rpc(format!("no liquidity pool for {pair}")))
    }

    async fn submit_transfer(&self, transfer: &SignedTransfer) -> Result<B256> {
        self.delay().await;
        self.state.lock().apply(transfer)
    }

    async fn disconnect(&self) -> Result<()> {
        self.state.lock().disconnections += 1;
        Ok(())
    }
}

/// [`Connector`] resolving endpoints to [`InMemoryLedger`]s.
#[derive(Debug, Default, Clone)]
pub struct InMemoryConnector {
    ledgers: HashMap<Url, InMemoryLedger>,
}

impl InMemoryConnector {
    /// Serves `ledger` at its endpoint.
    pub fn with_ledger(mut self, ledger: InMemoryLedger) -> Self {
        self.ledgers.insert(ledger.endpoint.clone(), ledger);
        self
    }
}

#[async_trait]
impl Connector for InMemoryConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn LedgerClient>> {
        let ledger = self.ledgers.get(endpoint).ok_or_else(|| LedgerError::Connect {
            endpoint: endpoint.clone(),
            reason: "unreachable".to_string(),
        })?;
        Ok(Box::new(ledger.open().await?))
    }
}
