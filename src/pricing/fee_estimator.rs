//! Transfer fee estimation.

use super::PoolPrice;
use crate::{
    error::{DispatchError, PricingError},
    transport::LedgerClient,
    types::{FeeProjection, TransferIntent},
};
use tracing::{debug, instrument};

/// Estimates the fee of a transfer in raw units of the transferred asset.
///
/// Native transfers pay their fee in the asset itself. Token transfers pay it in the network's
/// reference asset, so the projection is converted into the token through the liquidity pool of
/// the pair.
///
/// The estimate is a pure function of the queried projection and reserves.
#[derive(Debug)]
pub struct FeeEstimator<'a> {
    client: &'a dyn LedgerClient,
}

impl<'a> FeeEstimator<'a> {
    /// Creates a new fee estimator querying `client`.
    pub fn new(client: &'a dyn LedgerClient) -> Self {
        Self { client }
    }

    /// Returns the fee of `intent` in raw units of its asset.
    #[instrument(skip_all, fields(asset = %intent.asset.id))]
    pub async fn estimate(&self, intent: &TransferIntent) -> Result<u128, DispatchError> {
        let projection = self.client.fee_projection(&intent.descriptor(), intent.from).await?;
        let fee = projection.total().ok_or(PricingError::Overflow)?;

        let Some(pair) = intent.asset.pool_pair() else {
            return Ok(fee);
        };
        let reference = intent
            .asset
            .reference()
            .ok_or_else(|| PricingError::MissingReference(intent.asset.id.clone()))?;

        let quote = self.client.liquidity_reserves(&pair).await?;
        let price =
            PoolPrice::from_reserves(&pair, quote, reference.decimals, intent.asset.decimals)?;
        let fee = token_fee(projection, price, reference.decimals, intent.asset.decimals)?;

        debug!(%pair, price = price.as_f64(), fee, "Converted fee through liquidity pool");

        Ok(fee)
    }
}

/// Converts a fee projection denominated in the reference asset into raw token units.
pub fn token_fee(
    projection: FeeProjection,
    price: PoolPrice,
    reference_decimals: u8,
    token_decimals: u8,
) -> Result<u128, PricingError> {
    let fee = projection.total().ok_or(PricingError::Overflow)?;
    price.convert(fee, reference_decimals, token_decimals)
}
