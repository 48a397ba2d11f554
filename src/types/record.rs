use super::{AccountId, AssetId};
use alloy::primitives::B256;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of a successfully submitted transfer. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Transaction hash returned by the ledger.
    pub hash: B256,
    /// Transferred asset.
    pub asset: AssetId,
    /// Source account.
    pub from: AccountId,
    /// Recipient.
    pub to: AccountId,
    /// Transferred amount in human units.
    pub amount: Decimal,
    /// Explicit nonce the transfer was submitted with, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    /// Time the record was created.
    pub created_at: DateTime<Utc>,
}
