use crate::error::AmountError;
use derive_more::{Display, FromStr};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use url::Url;

/// Largest precision representable by a [`Decimal`].
const MAX_DECIMALS: u8 = 28;

/// A unique ID for an asset, e.g. `MYR` or `AUSD`.
#[derive(
    Debug, Display, Clone, Eq, PartialEq, Ord, PartialOrd, FromStr, Hash, Serialize, Deserialize,
)]
pub struct AssetId(String);

impl AssetId {
    /// Create a new asset ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the internal identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The asset a network charges its fees in, used to price fees of token transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceAsset {
    /// The reference asset ID, e.g. `ACA`.
    pub id: AssetId,
    /// Decimal precision of the reference asset.
    pub decimals: u8,
}

/// Whether an asset is the network's base currency or a token hosted on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AssetKind {
    /// The network's native asset. Fees are paid in it.
    Native,
    /// A fungible token. Fees are paid in `reference` and converted through a liquidity pool.
    Token {
        /// The asset fees are denominated in.
        reference: ReferenceAsset,
    },
}

/// A transferable asset on a specific ledger network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset identifier.
    pub id: AssetId,
    /// Decimal precision: one human unit is `10^decimals` raw units.
    pub decimals: u8,
    /// Endpoint of the network node hosting the asset.
    pub endpoint: Url,
    /// Native or token.
    pub kind: AssetKind,
}

impl Asset {
    /// Creates a native asset.
    pub fn native(id: impl Into<AssetId>, decimals: u8, endpoint: Url) -> Self {
        Self { id: id.into(), decimals, endpoint, kind: AssetKind::Native }
    }

    /// Creates a token asset whose fees are paid in `reference`.
    pub fn token(
        id: impl Into<AssetId>,
        decimals: u8,
        endpoint: Url,
        reference: ReferenceAsset,
    ) -> Self {
        Self { id: id.into(), decimals, endpoint, kind: AssetKind::Token { reference } }
    }

    /// Whether this is the native asset of its network.
    pub fn is_native(&self) -> bool {
        matches!(self.kind, AssetKind::Native)
    }

    /// The asset fees are paid in, if it differs from this asset.
    pub fn reference(&self) -> Option<&ReferenceAsset> {
        match &self.kind {
            AssetKind::Native => None,
            AssetKind::Token { reference } => Some(reference),
        }
    }

    /// The liquidity pool pair used to price this asset against its reference asset.
    pub fn pool_pair(&self) -> Option<AssetPair> {
        self.reference()
            .map(|reference| AssetPair { reference: reference.id.clone(), token: self.id.clone() })
    }

    /// Converts a raw amount into human units, i.e. `raw / 10^decimals`.
    pub fn to_human(&self, raw: u128) -> Result<Decimal, AmountError> {
        if self.decimals > MAX_DECIMALS {
            return Err(AmountError::Precision { decimals: self.decimals });
        }
        let mantissa = i128::try_from(raw).map_err(|_| AmountError::OutOfRange(raw.to_string()))?;
        Decimal::try_from_i128_with_scale(mantissa, self.decimals as u32)
            .map(|amount| amount.normalize())
            .map_err(|_| AmountError::OutOfRange(raw.to_string()))
    }

    /// Converts a human amount into raw units, i.e. `human * 10^decimals`.
    ///
    /// Fails if the amount is negative or has more fractional digits than the asset supports.
    pub fn to_raw(&self, human: Decimal) -> Result<u128, AmountError> {
        if self.decimals > MAX_DECIMALS {
            return Err(AmountError::Precision { decimals: self.decimals });
        }
        let unit = Decimal::try_from_i128_with_scale(10i128.pow(self.decimals as u32), 0)
            .map_err(|_| AmountError::Precision { decimals: self.decimals })?;
        let raw = human.checked_mul(unit).ok_or_else(|| AmountError::OutOfRange(human.to_string()))?;
        if !raw.fract().is_zero() {
            return Err(AmountError::OutOfRange(human.to_string()));
        }
        raw.to_u128().ok_or_else(|| AmountError::OutOfRange(human.to_string()))
    }
}

/// A liquidity pool pair, reference asset first.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display("{reference}/{token}")]
pub struct AssetPair {
    /// The asset fees are paid in.
    pub reference: AssetId,
    /// The token being priced.
    pub token: AssetId,
}

/// The set of assets the dispatcher knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRegistry(Vec<Asset>);

impl AssetRegistry {
    /// Create a new registry.
    pub fn new(assets: Vec<Asset>) -> Self {
        Self(assets)
    }

    /// Get an asset by its ID, if any.
    pub fn get(&self, id: &AssetId) -> Option<&Asset> {
        self.0.iter().find(|asset| &asset.id == id)
    }

    /// Get a mutable reference to an asset by its ID, if any.
    pub fn get_mut(&mut self, id: &AssetId) -> Option<&mut Asset> {
        self.0.iter_mut().find(|asset| &asset.id == id)
    }

    /// Iterate over all assets.
    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.0.iter()
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self(vec![
            Asset::native(
                "MYR",
                12,
                Url::parse(crate::constants::DEFAULT_NATIVE_ENDPOINT).expect("valid url"),
            ),
            Asset::token(
                "AUSD",
                12,
                Url::parse(crate::constants::DEFAULT_TOKEN_ENDPOINT).expect("valid url"),
                ReferenceAsset { id: "ACA".into(), decimals: 13 },
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn myr() -> Asset {
        Asset::native("MYR", 12, Url::parse("ws://127.0.0.1:9944").unwrap())
    }

    #[test]
    fn human_scaling() {
        let asset = myr();
        assert_eq!(asset.to_human(990).unwrap(), Decimal::from_str("0.00000000099").unwrap());
        assert_eq!(asset.to_human(10_000_000_000_000).unwrap(), Decimal::from(10));
        assert_eq!(asset.to_raw(Decimal::from(10)).unwrap(), 10_000_000_000_000);
        assert_eq!(asset.to_raw(Decimal::from_str("0.5").unwrap()).unwrap(), 500_000_000_000);
    }

    #[test]
    fn rejects_sub_unit_amounts() {
        let asset = myr();
        assert!(asset.to_raw(Decimal::from_str("0.0000000000001").unwrap()).is_err());
        assert!(asset.to_raw(Decimal::from(-1)).is_err());
    }

    #[test]
    fn default_registry() {
        let registry = AssetRegistry::default();
        let myr = registry.get(&"MYR".into()).unwrap();
        assert!(myr.is_native());
        assert!(myr.pool_pair().is_none());

        let ausd = registry.get(&"AUSD".into()).unwrap();
        assert!(!ausd.is_native());
        assert_eq!(ausd.pool_pair().unwrap().to_string(), "ACA/AUSD");
        assert!(registry.get(&"DOT".into()).is_none());
    }
}
