//! Dispatch bootstrap utilities.
use crate::{
    claim::{ClaimProcessor, ClaimReport},
    config::DispatchConfig,
    error::DispatchError,
    nonce::NonceSequencer,
    reward::RewardDispatcher,
    signers::DynSigner,
    storage::DispatchStorage,
    transport::{Connector, TimeoutConnector},
    types::{AccountId, AssetId, AssetRegistry, TransactionRecord},
};
use alloy::signers::local::coins_bip39::{English, Mnemonic};
use eyre::{OptionExt, WrapErr};
use sqlx::PgPool;
use std::{collections::HashMap, path::Path, sync::Arc};
use tracing::{info, instrument, level_filters::LevelFilter, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a global `tracing` subscriber logging to stdout, filtered by `RUST_LOG` and
/// defaulting to `INFO`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy(),
        )
        .init();
}

/// Entry point for dispatching rewards and batch claims.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    assets: Arc<AssetRegistry>,
    rewards: Arc<HashMap<AssetId, (RewardDispatcher, u128)>>,
    primary_reward: AssetId,
    claims: ClaimProcessor,
    custodial_mnemonic: Arc<Mnemonic<English>>,
    storage: DispatchStorage,
}

impl Dispatcher {
    /// Sends the primary reward to `to`.
    pub async fn send_reward(&self, to: AccountId) -> Result<TransactionRecord, DispatchError> {
        self.send_reward_in(&self.primary_reward, to).await
    }

    /// Sends the reward of the program paying in `asset` to `to`.
    ///
    /// Fails with [`DispatchError::UnsupportedAsset`] if no program pays in `asset`.
    #[instrument(skip(self))]
    pub async fn send_reward_in(
        &self,
        asset: &AssetId,
        to: AccountId,
    ) -> Result<TransactionRecord, DispatchError> {
        let (dispatcher, amount) = self
            .rewards
            .get(asset)
            .ok_or_else(|| DispatchError::UnsupportedAsset(asset.clone()))?;
        Ok(dispatcher.dispatch(to, *amount).await?)
    }

    /// Claims the balances of `assets` held by the custodial signer of `identity` into
    /// `beneficiary`.
    ///
    /// Unknown asset ids are rejected before anything is sent. Per-asset failures are reported,
    /// not returned.
    #[instrument(skip(self, identity))]
    pub async fn claim_tips(
        &self,
        beneficiary: AccountId,
        identity: &str,
        assets: &[AssetId],
    ) -> Result<ClaimReport, DispatchError> {
        let assets = assets
            .iter()
            .map(|id| {
                self.assets
                    .get(id)
                    .cloned()
                    .ok_or_else(|| DispatchError::UnsupportedAsset(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let signer = DynSigner::derive_custodial(&self.custodial_mnemonic, identity)?;

        Ok(self.claims.claim_all(beneficiary, &signer, &assets).await)
    }

    /// The asset registry.
    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    /// The storage backing this dispatcher.
    pub fn storage(&self) -> &DispatchStorage {
        &self.storage
    }
}

/// Loads the configuration at `config_path`, writing the defaults there first if it does not
/// exist, applies the environment overrides of [`DispatchConfig::with_env`] and spawns a
/// [`Dispatcher`].
pub async fn try_spawn_with_config_file<P: AsRef<Path>>(
    config_path: P,
    connector: Arc<dyn Connector>,
) -> eyre::Result<Dispatcher> {
    let config = if !config_path.as_ref().exists() {
        let config = DispatchConfig::default();
        config.save_to_file(&config_path)?;
        config
    } else {
        DispatchConfig::load_from_file(&config_path)?
    };

    try_spawn(config.with_env()?, connector).await
}

/// Spawns a [`Dispatcher`] from `config`, talking to ledgers through `connector`.
pub async fn try_spawn(
    config: DispatchConfig,
    connector: Arc<dyn Connector>,
) -> eyre::Result<Dispatcher> {
    // construct db
    let storage = if let Some(db_url) = &config.database_url {
        info!("Using PostgreSQL as storage.");
        let pool = PgPool::connect(db_url).await?;
        DispatchStorage::migrate(&pool).await?;

        DispatchStorage::pg(pool)
    } else {
        info!("Using in-memory storage.");
        DispatchStorage::in_memory()
    };

    let connector: Arc<dyn Connector> = Arc::new(TimeoutConnector::new(
        connector,
        config.transport.connect_timeout,
        config.transport.request_timeout,
    ));

    if config.secrets.uses_dev_mnemonic() {
        warn!("Signing with the public development mnemonic");
    }

    // reward dispatchers share the faucet signer, and so the sequencer
    let faucet = DynSigner::derive_faucet(&config.secrets.faucet_mnemonic)?;
    let sequencer = NonceSequencer::new(storage.clone());

    let mut rewards = HashMap::new();
    for program in config.reward_programs() {
        let asset = config
            .assets
            .get(&program.asset)
            .ok_or_eyre(format!("reward asset {} is not a known asset", program.asset))?;
        let amount = asset
            .to_raw(program.amount)
            .wrap_err_with(|| format!("invalid reward amount for {}", program.asset))?;
        let dispatcher = RewardDispatcher::new(
            asset.clone(),
            faucet.clone(),
            connector.clone(),
            storage.clone(),
            sequencer.clone(),
            config.accounts.placeholder_name.clone(),
        );
        if rewards.insert(asset.id.clone(), (dispatcher, amount)).is_some() {
            eyre::bail!("duplicate reward program for {}", asset.id);
        }
    }

    let primary_reward = config.rewards.primary.asset.clone();
    let claims =
        ClaimProcessor::new(connector, storage.clone()).with_reward_asset(primary_reward.clone());

    info!(faucet = %faucet.address(), programs = rewards.len(), "Spawned dispatcher");

    Ok(Dispatcher {
        assets: Arc::new(config.assets),
        rewards: Arc::new(rewards),
        primary_reward,
        claims,
        custodial_mnemonic: Arc::new(config.secrets.custodial_mnemonic),
        storage,
    })
}
