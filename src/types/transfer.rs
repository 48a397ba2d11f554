use super::{AccountId, Asset, AssetId};
use alloy::primitives::{B256, Signature, SignatureError, keccak256};
use serde::{Deserialize, Serialize};

/// What a transfer does, independent of who signs it.
///
/// Native assets are moved with a balance transfer, tokens with a token transfer naming the
/// asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDescriptor {
    /// Transferred asset.
    pub asset: AssetId,
    /// Whether this is a balance transfer of the native asset.
    pub native: bool,
    /// Recipient.
    pub to: AccountId,
    /// Amount in raw units.
    pub amount: u128,
}

impl TransferDescriptor {
    /// Returns the digest a signer commits to when submitting this transfer.
    ///
    /// The digest covers the signer and the explicit nonce, if any, so a signature cannot be
    /// replayed under another sequence number.
    pub fn signing_hash(&self, signer: AccountId, nonce: Option<u64>) -> B256 {
        let mut buf = Vec::with_capacity(128);
        buf.extend_from_slice(self.asset.as_str().as_bytes());
        buf.push(0);
        buf.push(self.native as u8);
        buf.extend_from_slice(self.to.as_slice());
        buf.extend_from_slice(&self.amount.to_be_bytes());
        buf.extend_from_slice(signer.as_slice());
        match nonce {
            Some(nonce) => {
                buf.push(1);
                buf.extend_from_slice(&nonce.to_be_bytes());
            }
            None => buf.push(0),
        }
        keccak256(buf)
    }
}

/// An ephemeral transfer: constructed, signed, submitted and discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferIntent {
    /// Transferred asset.
    pub asset: Asset,
    /// Signer paying for the transfer.
    pub from: AccountId,
    /// Recipient.
    pub to: AccountId,
    /// Amount in raw units that reaches the recipient.
    pub amount: u128,
    /// Fee in raw units of `asset` withheld from the source balance.
    pub fee: u128,
}

impl TransferIntent {
    /// Create a new intent without a fee.
    pub fn new(asset: Asset, from: AccountId, to: AccountId, amount: u128) -> Self {
        Self { asset, from, to, amount, fee: 0 }
    }

    /// Returns an intent transferring `amount - fee`, or `None` if nothing would be left.
    pub fn net_of_fee(self, fee: u128) -> Option<Self> {
        let amount = self.amount.checked_sub(fee).filter(|amount| *amount > 0)?;
        Some(Self { amount, fee, ..self })
    }

    /// The on-ledger description of this transfer.
    pub fn descriptor(&self) -> TransferDescriptor {
        TransferDescriptor {
            asset: self.asset.id.clone(),
            native: self.asset.is_native(),
            to: self.to,
            amount: self.amount,
        }
    }
}

/// A transfer signed by its source account, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    /// The transfer.
    pub descriptor: TransferDescriptor,
    /// Account that signed the transfer.
    pub signer: AccountId,
    /// Explicit sequence number. When absent the network assigns the next one.
    pub nonce: Option<u64>,
    /// Signature over [`TransferDescriptor::signing_hash`].
    pub signature: Signature,
}

impl SignedTransfer {
    /// Recovers the account that produced the signature.
    pub fn recover_signer(&self) -> Result<AccountId, SignatureError> {
        self.signature
            .recover_address_from_prehash(&self.descriptor.signing_hash(self.signer, self.nonce))
    }

    /// The transaction hash identifying this transfer on the ledger.
    pub fn hash(&self) -> B256 {
        let mut buf = self.descriptor.signing_hash(self.signer, self.nonce).to_vec();
        buf.extend_from_slice(&self.signature.as_bytes());
        keccak256(buf)
    }
}

/// Fee projection for a transfer, in raw units of the asset fees are paid in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeProjection {
    /// Weight component.
    pub weight: u128,
    /// Partial fee component.
    pub partial_fee: u128,
}

impl FeeProjection {
    /// `weight + partial_fee`, or `None` on overflow.
    pub fn total(&self) -> Option<u128> {
        self.weight.checked_add(self.partial_fee)
    }
}

/// Reserves of a liquidity pool, reference asset first. Used once to price a fee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityQuote {
    /// Reserve of the reference asset, raw units.
    pub reference_reserve: u128,
    /// Reserve of the token, raw units.
    pub token_reserve: u128,
}
