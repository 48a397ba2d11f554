//! Price conversion between a reference asset and a token priced through a liquidity pool.

use crate::{
    error::PricingError,
    types::{AssetPair, LiquidityQuote},
};
use alloy::primitives::U256;

/// Tokens per reference unit, derived from liquidity pool reserves.
///
/// Kept as the exact ratio `tokenReserve * 10^refDecimals / (referenceReserve * 10^tokenDecimals)`
/// so that conversions are reproducible bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolPrice {
    numerator: U256,
    denominator: U256,
}

impl PoolPrice {
    /// Derives the price from the reserves of `pair`, each side normalized by its own decimals.
    pub fn from_reserves(
        pair: &AssetPair,
        quote: LiquidityQuote,
        reference_decimals: u8,
        token_decimals: u8,
    ) -> Result<Self, PricingError> {
        if quote.reference_reserve == 0 || quote.token_reserve == 0 {
            return Err(PricingError::EmptyPool(pair.clone()));
        }

        Ok(Self {
            numerator: scale(U256::from(quote.token_reserve), reference_decimals)?,
            denominator: scale(U256::from(quote.reference_reserve), token_decimals)?,
        })
    }

    /// Converts a raw reference-asset amount into raw token units, rounding down.
    ///
    /// Formula: `floor(amount / 10^refDecimals * price * 10^tokenDecimals)`.
    pub fn convert(
        &self,
        amount: u128,
        reference_decimals: u8,
        token_decimals: u8,
    ) -> Result<u128, PricingError> {
        let numerator = scale(
            U256::from(amount).checked_mul(self.numerator).ok_or(PricingError::Overflow)?,
            token_decimals,
        )?;
        let denominator = scale(self.denominator, reference_decimals)?;

        u128::try_from(numerator / denominator).map_err(|_| PricingError::Overflow)
    }

    /// Approximate price as a float, for logging.
    pub fn as_f64(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

fn scale(value: U256, decimals: u8) -> Result<U256, PricingError> {
    U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .and_then(|unit| value.checked_mul(unit))
        .ok_or(PricingError::Overflow)
}
