//! Dispatch end-to-end test environment

use alloy::{
    primitives::Address,
    signers::local::coins_bip39::{English, Mnemonic},
};
use dispatch::{
    config::{DispatchConfig, RewardConfig},
    constants::DEV_MNEMONIC,
    signers::DynSigner,
    spawn::{Dispatcher, try_spawn},
    transport::{InMemoryConnector, InMemoryLedger},
    types::{Asset, AssetId, AssetPair, AssetRegistry, ReferenceAsset},
};
use rust_decimal::Decimal;
use std::{str::FromStr, sync::Arc, time::Duration};
use url::Url;

/// Endpoint of the network hosting the reward asset.
pub const MYRIAD_ENDPOINT: &str = "ws://myriad.test:9944";

/// Endpoint of the network hosting `ACA` and the `AUSD` token.
pub const ACALA_ENDPOINT: &str = "ws://acala.test:9944";

/// Endpoint nothing listens on.
pub const UNREACHABLE_ENDPOINT: &str = "ws://unreachable.test:9944";

/// Mnemonic the custodial signers are derived from.
pub const CUSTODIAL_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

/// The `ACA/AUSD` liquidity pool pair.
pub fn aca_ausd() -> AssetPair {
    AssetPair { reference: "ACA".into(), token: "AUSD".into() }
}

/// All settings for configuring the [`Environment`].
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub request_timeout: Duration,
    pub reward: Decimal,
    pub tip: Decimal,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self { request_timeout: Duration::from_secs(5), reward: Decimal::ONE, tip: Decimal::TEN }
    }
}

/// Dispatcher wired to in-memory ledgers:
///
/// - `MYR`: native, 12 decimals, on [`MYRIAD_ENDPOINT`]; the primary reward asset.
/// - `ACA`: native, 13 decimals, on [`ACALA_ENDPOINT`].
/// - `AUSD`: token, 12 decimals, on [`ACALA_ENDPOINT`], priced against `ACA`; tipped to new users.
/// - `DOT`: native, 10 decimals, on [`UNREACHABLE_ENDPOINT`].
#[derive(Debug)]
pub struct Environment {
    pub dispatcher: Dispatcher,
    pub myriad: InMemoryLedger,
    pub acala: InMemoryLedger,
    pub faucet: Address,
    custodial_mnemonic: Mnemonic<English>,
}

impl Environment {
    /// Sets up the environment with the default configuration.
    pub async fn setup() -> eyre::Result<Self> {
        Self::setup_with_config(EnvironmentConfig::default()).await
    }

    /// Sets up the environment.
    pub async fn setup_with_config(config: EnvironmentConfig) -> eyre::Result<Self> {
        let myriad_endpoint = Url::parse(MYRIAD_ENDPOINT)?;
        let acala_endpoint = Url::parse(ACALA_ENDPOINT)?;
        let aca = ReferenceAsset { id: "ACA".into(), decimals: 13 };
        let assets = AssetRegistry::new(vec![
            Asset::native("MYR", 12, myriad_endpoint.clone()),
            Asset::native(aca.id.clone(), aca.decimals, acala_endpoint.clone()),
            Asset::token("AUSD", 12, acala_endpoint.clone(), aca),
            Asset::native("DOT", 10, Url::parse(UNREACHABLE_ENDPOINT)?),
        ]);

        let myriad = InMemoryLedger::new(myriad_endpoint);
        let acala = InMemoryLedger::new(acala_endpoint);
        // DOT's endpoint is deliberately not served
        let connector =
            InMemoryConnector::default().with_ledger(myriad.clone()).with_ledger(acala.clone());

        let faucet_mnemonic = Mnemonic::<English>::from_str(DEV_MNEMONIC)?;
        let custodial_mnemonic = Mnemonic::<English>::from_str(CUSTODIAL_MNEMONIC)?;
        let faucet = DynSigner::derive_faucet(&faucet_mnemonic)?.address();

        let dispatcher = try_spawn(
            DispatchConfig::default()
                .with_assets(assets)
                .with_primary_reward(RewardConfig { asset: "MYR".into(), amount: config.reward })
                .with_extra_rewards(vec![RewardConfig { asset: "AUSD".into(), amount: config.tip }])
                .with_request_timeout(config.request_timeout)
                .with_faucet_mnemonic(faucet_mnemonic)
                .with_custodial_mnemonic(custodial_mnemonic.clone()),
            Arc::new(connector),
        )
        .await?;

        Ok(Self { dispatcher, myriad, acala, faucet, custodial_mnemonic })
    }

    /// Returns the custodial signer of `identity`.
    pub fn custodial_signer(&self, identity: &str) -> eyre::Result<DynSigner> {
        DynSigner::derive_custodial(&self.custodial_mnemonic, identity)
    }

    /// Returns the registered asset `id`.
    pub fn asset(&self, id: &str) -> Asset {
        self.dispatcher.assets().get(&AssetId::from(id)).cloned().unwrap()
    }
}
