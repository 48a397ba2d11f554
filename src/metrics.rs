//! Workflow metrics.
//!
//! Metrics are recorded through the [`metrics`] facade; installing a recorder is left to the
//! embedding application.

use metrics::Counter;
use metrics_derive::Metrics;

/// Metrics for the [`ClaimProcessor`](crate::claim::ClaimProcessor).
#[derive(Metrics)]
#[metrics(scope = "claims")]
pub struct ClaimMetrics {
    /// Number of assets transferred to a beneficiary.
    pub claimed: Counter,
    /// Number of assets skipped for lack of balance.
    pub skipped: Counter,
    /// Number of assets that failed and were passed over.
    pub failed: Counter,
}

/// Metrics for the [`RewardDispatcher`](crate::reward::RewardDispatcher).
#[derive(Metrics)]
#[metrics(scope = "rewards")]
pub struct RewardMetrics {
    /// Number of dispatched rewards.
    pub dispatched: Counter,
    /// Number of failed reward dispatches.
    pub failed: Counter,
    /// Number of placeholder identities created for reward recipients.
    pub accounts_created: Counter,
}

/// Metrics for the [`NonceSequencer`](crate::nonce::NonceSequencer).
#[derive(Metrics)]
#[metrics(scope = "nonces")]
pub struct NonceMetrics {
    /// Number of allocated nonces.
    pub allocated: Counter,
    /// Number of allocations where the node-reported nonce was behind the counter.
    pub stale_observed: Counter,
}
