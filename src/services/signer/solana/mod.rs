//! Solana signer abstraction and the helper that places a signature into a
//! transaction's signature slots.
//!
//! # Architecture
//!
//! ```text
//! SolanaSignTrait
//!   └── LocalSigner (in-process ed25519 keypair)
//! ```
use async_trait::async_trait;
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::Transaction};

mod local_signer;
pub use local_signer::*;

use super::SignerError;
#[cfg(test)]
use mockall::automock;

#[async_trait]
#[cfg_attr(test, automock)]
/// Trait defining Solana-specific signing operations
pub trait SolanaSignTrait: Sync + Send {
    /// Returns the public key of the signer
    async fn pubkey(&self) -> Result<Pubkey, SignerError>;

    /// Signs a message using the Solana signing scheme (ed25519 over the
    /// serialized message bytes)
    async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError>;
}

/// Signs a Solana SDK transaction by finding the signer's position among the
/// required signers and writing the signature into that slot.
///
/// Existing signatures are preserved and the signature vector is sized to
/// `num_required_signatures`, so signing the same transaction twice with the
/// same key leaves it unchanged.
pub async fn sign_sdk_transaction<T: SolanaSignTrait + ?Sized>(
    signer: &T,
    mut transaction: Transaction,
) -> Result<(Transaction, Signature), SignerError> {
    let signer_pubkey = signer.pubkey().await?;
    let num_required = transaction.message.header.num_required_signatures as usize;

    let signer_index = transaction
        .message
        .account_keys
        .iter()
        .position(|key| *key == signer_pubkey)
        .filter(|index| *index < num_required)
        .ok_or_else(|| SignerError::NotRequiredSigner {
            signer: signer_pubkey.to_string(),
        })?;

    let signature = signer.sign(&transaction.message_data()).await?;

    transaction
        .signatures
        .resize(num_required, Signature::default());
    transaction.signatures[signer_index] = signature;

    Ok((transaction, signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        hash::Hash,
        message::Message,
        signature::{Keypair, Signer},
    };
    use solana_system_interface::instruction as system_instruction;

    fn two_signer_transaction(payer: &Pubkey, sender: &Pubkey) -> Transaction {
        let ix = system_instruction::transfer(sender, &Pubkey::new_unique(), 10);
        let message = Message::new_with_blockhash(&[ix], Some(payer), &Hash::default());
        Transaction::new_unsigned(message)
    }

    #[tokio::test]
    async fn test_sign_places_signature_at_signer_index() {
        let payer = Keypair::new();
        let sender = Keypair::new();
        let tx = two_signer_transaction(&payer.pubkey(), &sender.pubkey());

        let signer = LocalSigner::new(sender.insecure_clone());
        let (signed, signature) = sign_sdk_transaction(&signer, tx).await.unwrap();

        assert_eq!(signed.signatures.len(), 2);
        assert_eq!(signed.signatures[0], Signature::default());
        assert_eq!(signed.signatures[1], signature);
        assert!(signature.verify(sender.pubkey().as_ref(), &signed.message_data()));
    }

    #[tokio::test]
    async fn test_sign_twice_is_idempotent() {
        let payer = Keypair::new();
        let tx = two_signer_transaction(&payer.pubkey(), &payer.pubkey());
        let signer = LocalSigner::new(payer);

        let (once, _) = sign_sdk_transaction(&signer, tx).await.unwrap();
        let (twice, _) = sign_sdk_transaction(&signer, once.clone()).await.unwrap();

        assert_eq!(once.signatures, twice.signatures);
    }

    #[tokio::test]
    async fn test_sign_rejects_unrelated_key() {
        let payer = Keypair::new();
        let tx = two_signer_transaction(&payer.pubkey(), &payer.pubkey());

        let mut mock = MockSolanaSignTrait::new();
        let stranger = Pubkey::new_unique();
        mock.expect_pubkey()
            .returning(move || Box::pin(async move { Ok(stranger) }));
        mock.expect_sign().never();

        let result = sign_sdk_transaction(&mock, tx).await;
        assert!(matches!(
            result,
            Err(SignerError::NotRequiredSigner { signer }) if signer == stranger.to_string()
        ));
    }

    #[tokio::test]
    async fn test_sign_propagates_signer_failure() {
        let payer = Keypair::new();
        let payer_pubkey = payer.pubkey();
        let tx = two_signer_transaction(&payer_pubkey, &payer_pubkey);

        let mut mock = MockSolanaSignTrait::new();
        mock.expect_pubkey()
            .returning(move || Box::pin(async move { Ok(payer_pubkey) }));
        mock.expect_sign()
            .returning(|_| {
                Box::pin(async {
                    Err(SignerError::SigningError("device unplugged".to_string()))
                })
            });

        let result = sign_sdk_transaction(&mock, tx).await;
        assert!(matches!(result, Err(SignerError::SigningError(_))));
    }
}
