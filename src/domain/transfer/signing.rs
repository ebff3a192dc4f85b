//! Applies signatures from the supplied accounts to an assembled transaction.

use tracing::debug;

use crate::{
    models::{Account, AssembledTransaction, TransferError},
    services::{sign_sdk_transaction, SignerError},
};

/// Signs `transaction` with every account in `keys`.
///
/// Each signature lands in the slot of its account among the required
/// signers, so signing twice with the same key leaves the transaction
/// unchanged. The transaction is only updated when every key signed.
pub async fn sign(
    transaction: &mut AssembledTransaction,
    keys: &[Account],
) -> Result<(), TransferError> {
    let mut signed = transaction.transaction.clone();

    for account in keys {
        let address = account.address();
        let signer = account
            .signer()
            .ok_or(TransferError::MissingSigningCapability(address))?;

        if !transaction.required_signers().contains(&address) {
            return Err(TransferError::SignerNotRequired(address));
        }
        let signer_pubkey = signer.pubkey().await?;
        if signer_pubkey != address {
            return Err(TransferError::SigningFailed(SignerError::KeyError(format!(
                "signer key {signer_pubkey} does not match account {address}"
            ))));
        }

        let (next, signature) = sign_sdk_transaction(signer.as_ref(), signed)
            .await
            .map_err(|e| match e {
                SignerError::NotRequiredSigner { .. } => TransferError::SignerNotRequired(address),
                other => TransferError::SigningFailed(other),
            })?;
        debug!(account = %address, %signature, "signed transaction");
        signed = next;
    }

    transaction.transaction = signed;
    Ok(())
}
