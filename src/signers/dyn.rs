//! Custodial signer abstraction.
//!
//! A signer abstracted over the underlying key source.
use crate::types::{SignedTransfer, TransferDescriptor};
use alloy::{
    primitives::{Address, Signature},
    signers::{
        Signer,
        k256::ecdsa::SigningKey,
        local::{
            PrivateKeySigner,
            coins_bip39::{English, Mnemonic},
        },
    },
};
use std::{fmt, ops::Deref, sync::Arc};

/// Derivation path of the single signer held by a mnemonic.
const DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Abstraction over local signer.
#[derive(Clone)]
pub struct DynSigner(pub Arc<dyn Signer<Signature> + Send + Sync>);

impl fmt::Debug for DynSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DynSigner").field(&self.address()).finish()
    }
}

impl DynSigner {
    /// Derives the shared faucet signer from a mnemonic.
    pub fn derive_faucet(mnemonic: &Mnemonic<English>) -> eyre::Result<Self> {
        Self::derive(mnemonic, None)
    }

    /// Derives the custodial signer of a beneficiary.
    ///
    /// The beneficiary's external `identity` is used as the BIP-39 passphrase, so each identity
    /// maps to a distinct and reproducible signer.
    pub fn derive_custodial(mnemonic: &Mnemonic<English>, identity: &str) -> eyre::Result<Self> {
        Self::derive(mnemonic, Some(identity))
    }

    fn derive(mnemonic: &Mnemonic<English>, passphrase: Option<&str>) -> eyre::Result<Self> {
        let key = mnemonic.derive_key(DERIVATION_PATH, passphrase)?;
        let key: &SigningKey = key.as_ref();
        Ok(Self(Arc::new(PrivateKeySigner::from_signing_key(key.clone()))))
    }

    /// Returns the signer's address.
    pub fn address(&self) -> Address {
        Signer::address(self.0.as_ref())
    }

    /// Signs `transfer`, optionally pinned to an explicit `nonce`.
    pub async fn sign_transfer(
        &self,
        transfer: TransferDescriptor,
        nonce: Option<u64>,
    ) -> alloy::signers::Result<SignedTransfer> {
        let signer = self.address();
        let signature = self.sign_hash(&transfer.signing_hash(signer, nonce)).await?;
        Ok(SignedTransfer { descriptor: transfer, signer, nonce, signature })
    }
}

impl Deref for DynSigner {
    type Target = dyn Signer<Signature> + Send + Sync;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
