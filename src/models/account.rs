//! Account identity used as a transfer participant or fee payer.

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::{fmt, sync::Arc};

use crate::services::{LocalSigner, SignerError, SolanaSignTrait};

/// An address the harness can reference, optionally together with the
/// capability to sign for it.
#[derive(Clone)]
pub struct Account {
    address: Pubkey,
    signer: Option<Arc<dyn SolanaSignTrait>>,
}

impl Account {
    /// Generates a fresh keypair-backed account.
    pub fn generate() -> Self {
        Self::from_keypair(Keypair::new())
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        let address = keypair.pubkey();
        Self {
            address,
            signer: Some(Arc::new(LocalSigner::new(keypair))),
        }
    }

    /// Loads an account from a base58-encoded 64-byte secret key.
    pub fn from_base58_secret(secret: &str) -> Result<Self, SignerError> {
        let bytes = bs58::decode(secret.trim())
            .into_vec()
            .map_err(|e| SignerError::KeyError(format!("Invalid base58 secret key: {e}")))?;
        let keypair = Keypair::try_from(bytes.as_slice())
            .map_err(|e| SignerError::KeyError(format!("Invalid keypair bytes: {e}")))?;
        Ok(Self::from_keypair(keypair))
    }

    /// An account the harness can reference but not sign for.
    pub fn watch_only(address: Pubkey) -> Self {
        Self {
            address,
            signer: None,
        }
    }

    /// An account whose signatures come from an external signer.
    pub fn with_signer(address: Pubkey, signer: Arc<dyn SolanaSignTrait>) -> Self {
        Self {
            address,
            signer: Some(signer),
        }
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn signer(&self) -> Option<&Arc<dyn SolanaSignTrait>> {
        self.signer.as_ref()
    }

    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    /// Drops the signing capability, keeping only the address.
    pub fn to_watch_only(&self) -> Self {
        Self::watch_only(self.address)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .field("can_sign", &self.can_sign())
            .finish()
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for Account {}
