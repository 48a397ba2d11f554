//! # Dispatch
//!
//! Dispatches value transfers to ledger networks on behalf of users: fixed-amount rewards from a
//! shared faucet signer with sequenced nonces, and fee-aware batch claims that move every balance
//! held by a beneficiary's custodial signer to the beneficiary.

pub mod claim;
pub mod config;
pub mod connection;
pub mod constants;
pub mod error;
pub mod metrics;
pub mod nonce;
pub mod pricing;
pub mod reward;
pub mod serde;
pub mod signers;
pub mod spawn;
pub mod storage;
pub mod transport;
pub mod types;
