//! Pricing-specific error types.

use crate::types::{AssetId, AssetPair};

/// Errors that can occur during fee estimation.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    /// One side of the liquidity pool is empty, so no price exists.
    #[error("Liquidity pool {0} has no reserves")]
    EmptyPool(AssetPair),

    /// The token asset has no reference asset to price its fee in.
    #[error("No reference asset configured for {0}")]
    MissingReference(AssetId),

    /// The fee projection overflowed.
    #[error("Fee projection overflow")]
    Overflow,
}
