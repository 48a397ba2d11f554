use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An address on a ledger network.
pub type AccountId = Address;

/// A known identity. Created as a placeholder the first time an unknown account receives a
/// reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    /// The account address.
    pub id: AccountId,
    /// Display name.
    pub display_name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl AccountRecord {
    /// Create a new record stamped with the current time.
    pub fn new(id: AccountId, display_name: impl Into<String>) -> Self {
        Self { id, display_name: display_name.into(), created_at: Utc::now() }
    }
}
