//! Fee estimation, including price discovery through liquidity pools.

mod fee_estimator;
pub use fee_estimator::{FeeEstimator, token_fee};

mod price_converter;
pub use price_converter::PoolPrice;
