//! Dispatch configuration.
use crate::{
    constants::{
        CUSTODIAL_MNEMONIC_ENV, DATABASE_URL_ENV, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PLACEHOLDER_NAME,
        DEFAULT_REQUEST_TIMEOUT, DEV_MNEMONIC, FAUCET_MNEMONIC_ENV, REWARD_AMOUNT_ENV,
        REWARD_ENDPOINT_ENV,
    },
    types::{AssetId, AssetRegistry},
};
use alloy::signers::local::coins_bip39::{English, Mnemonic};
use eyre::{Context, OptionExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{path::Path, str::FromStr, time::Duration};
use url::Url;

/// Dispatch configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Known assets and the endpoints hosting them.
    #[serde(default)]
    pub assets: AssetRegistry,
    /// Reward programs.
    #[serde(default)]
    pub rewards: RewardsConfig,
    /// Ledger transport configuration.
    #[serde(default)]
    pub transport: TransportConfig,
    /// Account registry configuration.
    #[serde(default)]
    pub accounts: AccountsConfig,
    /// Secrets.
    #[serde(skip_serializing, default)]
    pub secrets: SecretsConfig,
    /// Database URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
}

impl DispatchConfig {
    /// Sets the asset registry.
    pub fn with_assets(mut self, assets: AssetRegistry) -> Self {
        self.assets = assets;
        self
    }

    /// Sets the primary reward program.
    pub fn with_primary_reward(mut self, reward: RewardConfig) -> Self {
        self.rewards.primary = reward;
        self
    }

    /// Sets the extra reward programs.
    pub fn with_extra_rewards(mut self, rewards: Vec<RewardConfig>) -> Self {
        self.rewards.extra = rewards;
        self
    }

    /// Sets the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.transport.connect_timeout = timeout;
        self
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.transport.request_timeout = timeout;
        self
    }

    /// Sets the display name of placeholder identities.
    pub fn with_placeholder_name(mut self, name: impl Into<String>) -> Self {
        self.accounts.placeholder_name = name.into();
        self
    }

    /// Sets the faucet mnemonic.
    pub fn with_faucet_mnemonic(mut self, mnemonic: Mnemonic<English>) -> Self {
        self.secrets.faucet_mnemonic = mnemonic;
        self
    }

    /// Sets the custodial mnemonic.
    pub fn with_custodial_mnemonic(mut self, mnemonic: Mnemonic<English>) -> Self {
        self.secrets.custodial_mnemonic = mnemonic;
        self
    }

    /// Sets the database URL.
    pub fn with_database_url(mut self, database_url: Option<String>) -> Self {
        self.database_url = database_url;
        self
    }

    /// Applies overrides from the process environment.
    ///
    /// See [`DispatchConfig::with_env_from`] for the variables read.
    pub fn with_env(self) -> eyre::Result<Self> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `var`:
    ///
    /// - `DISPATCH_FAUCET_MNEMONIC`: the faucet mnemonic
    /// - `DISPATCH_CUSTODIAL_MNEMONIC`: the custodial mnemonic
    /// - `DISPATCH_REWARD_AMOUNT`: the primary reward amount, in human units
    /// - `DISPATCH_REWARD_ENDPOINT`: the endpoint of the primary reward asset
    /// - `DISPATCH_DB_URL`: the database URL
    pub fn with_env_from(mut self, var: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        if let Some(phrase) = var(FAUCET_MNEMONIC_ENV) {
            self.secrets.faucet_mnemonic = Mnemonic::from_str(&phrase)
                .wrap_err_with(|| format!("invalid {FAUCET_MNEMONIC_ENV}"))?;
        }
        if let Some(phrase) = var(CUSTODIAL_MNEMONIC_ENV) {
            self.secrets.custodial_mnemonic = Mnemonic::from_str(&phrase)
                .wrap_err_with(|| format!("invalid {CUSTODIAL_MNEMONIC_ENV}"))?;
        }
        if let Some(amount) = var(REWARD_AMOUNT_ENV) {
            self.rewards.primary.amount = Decimal::from_str(&amount)
                .wrap_err_with(|| format!("invalid {REWARD_AMOUNT_ENV}"))?;
        }
        if let Some(endpoint) = var(REWARD_ENDPOINT_ENV) {
            let endpoint = Url::parse(&endpoint)
                .wrap_err_with(|| format!("invalid {REWARD_ENDPOINT_ENV}"))?;
            let asset = &self.rewards.primary.asset;
            self.assets
                .get_mut(asset)
                .ok_or_eyre(format!("reward asset {asset} is not a known asset"))?
                .endpoint = endpoint;
        }
        if let Some(database_url) = var(DATABASE_URL_ENV) {
            self.database_url = Some(database_url);
        }
        Ok(self)
    }

    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save to a YAML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns all reward programs, primary first.
    pub fn reward_programs(&self) -> impl Iterator<Item = &RewardConfig> {
        std::iter::once(&self.rewards.primary).chain(&self.rewards.extra)
    }
}

/// A fixed-amount transfer from the faucet to new users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardConfig {
    /// The asset the reward is paid in.
    pub asset: AssetId,
    /// Reward amount in human units.
    pub amount: Decimal,
}

/// Reward programs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardsConfig {
    /// The primary reward. Its asset is the network's designated reward asset and is never
    /// claimed in batch claims.
    pub primary: RewardConfig,
    /// Additional rewards, e.g. a welcome tip in a token.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<RewardConfig>,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            primary: RewardConfig { asset: "MYR".into(), amount: Decimal::ONE },
            extra: vec![RewardConfig { asset: "AUSD".into(), amount: Decimal::TEN }],
        }
    }
}

/// Ledger transport configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Time allowed for establishing a connection.
    #[serde(with = "crate::serde::duration")]
    pub connect_timeout: Duration,
    /// Time allowed for a single query or submission.
    #[serde(with = "crate::serde::duration")]
    pub request_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { connect_timeout: DEFAULT_CONNECT_TIMEOUT, request_timeout: DEFAULT_REQUEST_TIMEOUT }
    }
}

/// Account registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsConfig {
    /// Display name of placeholder identities.
    pub placeholder_name: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self { placeholder_name: DEFAULT_PLACEHOLDER_NAME.to_string() }
    }
}

/// Secrets (kept out of serialized output).
#[derive(Debug, Clone, Deserialize)]
pub struct SecretsConfig {
    /// Mnemonic of the shared faucet signer.
    #[serde(with = "alloy::serde::displayfromstr")]
    pub faucet_mnemonic: Mnemonic<English>,
    /// Mnemonic the custodial signers of beneficiaries are derived from.
    #[serde(with = "alloy::serde::displayfromstr")]
    pub custodial_mnemonic: Mnemonic<English>,
}

impl SecretsConfig {
    /// Whether either mnemonic is still the public development mnemonic.
    pub fn uses_dev_mnemonic(&self) -> bool {
        [&self.faucet_mnemonic, &self.custodial_mnemonic]
            .iter()
            .any(|mnemonic| mnemonic.to_phrase() == DEV_MNEMONIC)
    }
}

impl Default for SecretsConfig {
    fn default() -> Self {
        let mnemonic = Mnemonic::<English>::from_str(DEV_MNEMONIC).unwrap();
        Self { faucet_mnemonic: mnemonic.clone(), custodial_mnemonic: mnemonic }
    }
}
