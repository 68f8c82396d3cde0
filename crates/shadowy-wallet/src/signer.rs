//! Envelope signing.
//!
//! The ML-DSA-87 signature covers the raw canonical transaction bytes, not
//! the hash. Envelope fields are private and only [`TransactionSigner`]
//! constructs envelopes, so bytes, hash, and signature always belong together.

use serde::{Deserialize, Serialize};
use tracing::debug;

use shadowy_core::constants::{ALGORITHM_ID, ENVELOPE_TYPE};
use shadowy_core::crypto::{KeyPair, PublicKey, Signature};
use shadowy_core::error::CryptoError;
use shadowy_core::types::{TransactionDraft, TxHash};

use crate::builder::UnsignedTransaction;
use crate::error::WalletError;

/// Envelope header announcing the signature scheme.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub alg: String,
    pub typ: String,
}

impl Default for EnvelopeHeader {
    fn default() -> Self {
        Self {
            alg: ALGORITHM_ID.to_string(),
            typ: ENVELOPE_TYPE.to_string(),
        }
    }
}

/// A signed transaction envelope.
#[derive(Clone, Debug)]
pub struct SignedEnvelope {
    transaction_bytes: Vec<u8>,
    signature: Signature,
    tx_hash: TxHash,
    signer_public_key: PublicKey,
    algorithm: String,
    header: EnvelopeHeader,
}

impl SignedEnvelope {
    /// The exact bytes that were hashed and signed.
    pub fn transaction_bytes(&self) -> &[u8] {
        &self.transaction_bytes
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn tx_hash(&self) -> &TxHash {
        &self.tx_hash
    }

    pub fn signer_public_key(&self) -> &PublicKey {
        &self.signer_public_key
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn header(&self) -> &EnvelopeHeader {
        &self.header
    }

    /// Parse the signed bytes back into a typed draft.
    pub fn draft(&self) -> Result<TransactionDraft, WalletError> {
        Ok(TransactionDraft::from_canonical_bytes(&self.transaction_bytes)?)
    }

    /// Check that the hash matches the bytes and the signature verifies
    /// against the embedded signer key.
    pub fn verify(&self) -> Result<(), WalletError> {
        if TxHash::of(&self.transaction_bytes) != self.tx_hash {
            return Err(WalletError::Validation(
                "tx hash does not match transaction bytes".into(),
            ));
        }
        self.signer_public_key
            .verify(&self.transaction_bytes, &self.signature)?;
        Ok(())
    }

    /// The JSON payload submitted to the node.
    pub fn to_wire(&self) -> Result<WireEnvelope, WalletError> {
        Ok(WireEnvelope {
            transaction: self.draft()?,
            signature: self.signature.to_hex(),
            tx_hash: self.tx_hash.to_string(),
            signer_key: self.signer_public_key.to_hex(),
            algorithm: self.algorithm.clone(),
            header: self.header.clone(),
        })
    }
}

/// Wire form of a [`SignedEnvelope`]: the draft as a JSON object and the
/// signature material hex-encoded.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WireEnvelope {
    pub transaction: TransactionDraft,
    pub signature: String,
    pub tx_hash: String,
    pub signer_key: String,
    pub algorithm: String,
    pub header: EnvelopeHeader,
}

impl WireEnvelope {
    /// Rebuild and verify an envelope received in wire form.
    pub fn into_envelope(self) -> Result<SignedEnvelope, WalletError> {
        let transaction_bytes = self.transaction.canonical_bytes()?;
        let tx_hash = TxHash::from_hex(&self.tx_hash)?;
        let signature = Signature::from_hex(&self.signature)?;
        let signer_public_key = PublicKey::from_hex(&self.signer_key)?;
        if self.algorithm != ALGORITHM_ID {
            return Err(WalletError::Crypto(CryptoError::Encoding(format!(
                "unsupported algorithm {}",
                self.algorithm
            ))));
        }
        let envelope = SignedEnvelope {
            transaction_bytes,
            signature,
            tx_hash,
            signer_public_key,
            algorithm: self.algorithm,
            header: self.header,
        };
        envelope.verify()?;
        Ok(envelope)
    }
}

/// Signs drafts into envelopes.
pub struct TransactionSigner;

impl TransactionSigner {
    /// Serialize, hash and sign a draft.
    pub fn sign(draft: &TransactionDraft, key_pair: &KeyPair) -> Result<SignedEnvelope, WalletError> {
        let bytes = draft.canonical_bytes()?;
        let hash = TxHash::of(&bytes);
        Self::sign_bytes(bytes, hash, key_pair)
    }

    /// Sign a built transaction, reusing its canonical bytes and hash.
    ///
    /// Refuses with [`WalletError::Validation`] if the bytes no longer match
    /// the draft or the hash.
    pub fn sign_unsigned(
        unsigned: &UnsignedTransaction,
        key_pair: &KeyPair,
    ) -> Result<SignedEnvelope, WalletError> {
        unsigned.check_consistency()?;
        Self::sign_bytes(
            unsigned.canonical_bytes().to_vec(),
            *unsigned.tx_hash(),
            key_pair,
        )
    }

    fn sign_bytes(
        transaction_bytes: Vec<u8>,
        tx_hash: TxHash,
        key_pair: &KeyPair,
    ) -> Result<SignedEnvelope, WalletError> {
        let signature = key_pair.sign(&transaction_bytes)?;
        debug!(
            %tx_hash,
            bytes = transaction_bytes.len(),
            signature_len = signature.as_bytes().len(),
            "transaction signed"
        );
        Ok(SignedEnvelope {
            transaction_bytes,
            signature,
            tx_hash,
            signer_public_key: key_pair.public_key().clone(),
            algorithm: ALGORITHM_ID.to_string(),
            header: EnvelopeHeader::default(),
        })
    }
}
