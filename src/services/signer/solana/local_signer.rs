//! Signer backed by an in-process ed25519 keypair.
use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use std::fmt;

use super::SolanaSignTrait;
use crate::services::SignerError;

pub struct LocalSigner {
    keypair: Keypair,
}

impl LocalSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("pubkey", &self.keypair.pubkey())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SolanaSignTrait for LocalSigner {
    async fn pubkey(&self) -> Result<Pubkey, SignerError> {
        Ok(self.keypair.pubkey())
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError> {
        self.keypair
            .try_sign_message(message)
            .map_err(|e| SignerError::SigningError(e.to_string()))
    }
}
