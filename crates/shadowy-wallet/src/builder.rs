//! Transaction builder producing canonical drafts.
//!
//! Provides a builder pattern for constructing transactions:
//! 1. Configure fee and (optionally) a fixed timestamp
//! 2. Build an unsigned transaction from already-selected UTXOs
//! 3. Sign it with [`crate::signer::TransactionSigner`]

use chrono::{DateTime, Utc};
use tracing::debug;

use shadowy_core::address::Address;
use shadowy_core::constants::{DEFAULT_FEE, SEQUENCE_FINAL};
use shadowy_core::types::{TransactionDraft, TxHash, TxInput, TxOutput, Utxo};

use crate::error::WalletError;

/// An unsigned transaction ready for signing.
///
/// The canonical bytes and hash are computed once at build time; signing
/// reuses them rather than re-serializing the draft. Draft, bytes and hash
/// are read-only so they cannot drift apart after the build.
#[derive(Debug, Clone)]
pub struct UnsignedTransaction {
    draft: TransactionDraft,
    canonical_bytes: Vec<u8>,
    tx_hash: TxHash,
    /// Amount paid to the destination.
    pub amount: u64,
    /// Fee left to the network.
    pub fee: u64,
    /// Value returned to the change address (0 when no change output).
    pub change: u64,
    /// Total value of the spent UTXOs.
    pub total_selected: u64,
}

impl UnsignedTransaction {
    /// The draft in canonical field order.
    pub fn draft(&self) -> &TransactionDraft {
        &self.draft
    }

    /// Compact JSON of the draft.
    pub fn canonical_bytes(&self) -> &[u8] {
        &self.canonical_bytes
    }

    /// SHA-256 of [`Self::canonical_bytes`].
    pub fn tx_hash(&self) -> &TxHash {
        &self.tx_hash
    }

    /// Check that the bytes still encode the draft and hash to `tx_hash`.
    pub fn check_consistency(&self) -> Result<(), WalletError> {
        if TxHash::of(&self.canonical_bytes) != self.tx_hash {
            return Err(WalletError::Validation(
                "tx hash does not match canonical bytes".into(),
            ));
        }
        if self.draft.canonical_bytes()? != self.canonical_bytes {
            return Err(WalletError::Validation(
                "canonical bytes do not encode the draft".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for unsigned transactions.
///
/// # Example
/// ```ignore
/// let unsigned = TransactionBuilder::new()
///     .set_fee(DEFAULT_FEE)
///     .build(&selection.selected, destination, 6 * COIN, source_address)?;
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    fee: u64,
    timestamp: Option<DateTime<Utc>>,
}

impl TransactionBuilder {
    /// Create a builder with [`DEFAULT_FEE`] and the current time.
    pub fn new() -> Self {
        Self {
            fee: DEFAULT_FEE,
            timestamp: None,
        }
    }

    /// Override the fee (default: [`DEFAULT_FEE`]).
    pub fn set_fee(&mut self, fee: u64) -> &mut Self {
        self.fee = fee;
        self
    }

    /// Pin the draft timestamp for reproducible output.
    pub fn set_timestamp(&mut self, timestamp: DateTime<Utc>) -> &mut Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// The configured fee.
    pub fn fee(&self) -> u64 {
        self.fee
    }

    /// Build an unsigned transaction spending every UTXO in `selected`.
    ///
    /// Produces one output paying `amount` to `destination` and, when the
    /// inputs exceed `amount + fee`, one change output to `change_address`.
    pub fn build(
        &self,
        selected: &[Utxo],
        destination: &str,
        amount: u64,
        change_address: &str,
    ) -> Result<UnsignedTransaction, WalletError> {
        let destination = Address::decode(destination)?;
        let change_address = Address::decode(change_address)?;

        if amount == 0 {
            return Err(WalletError::InvalidAmount("amount must be non-zero".into()));
        }

        if selected.is_empty() {
            return Err(WalletError::NoUtxos);
        }

        let total_selected = selected
            .iter()
            .try_fold(0u64, |acc, u| acc.checked_add(u.value))
            .ok_or_else(|| WalletError::InvalidAmount("UTXO total overflow".into()))?;

        let needed = amount
            .checked_add(self.fee)
            .ok_or_else(|| WalletError::InvalidAmount("amount plus fee overflows".into()))?;

        if total_selected < needed {
            return Err(WalletError::InsufficientFunds {
                needed,
                have: total_selected,
            });
        }

        let inputs: Vec<TxInput> = selected
            .iter()
            .map(|u| TxInput {
                txid: u.txid.clone(),
                vout: u.vout,
                script_sig: String::new(),
                sequence: SEQUENCE_FINAL,
            })
            .collect();

        let mut outputs = vec![pay_to(&destination, amount)];

        let change = total_selected - needed;
        if change > 0 {
            outputs.push(pay_to(&change_address, change));
        }

        let draft = TransactionDraft::new(inputs, outputs, self.timestamp.unwrap_or_else(Utc::now));
        let canonical_bytes = draft.canonical_bytes()?;
        let tx_hash = TxHash::of(&canonical_bytes);

        debug!(
            inputs = draft.inputs.len(),
            outputs = draft.outputs.len(),
            amount,
            fee = self.fee,
            change,
            bytes = canonical_bytes.len(),
            %tx_hash,
            "transaction draft built"
        );

        Ok(UnsignedTransaction {
            draft,
            canonical_bytes,
            tx_hash,
            amount,
            fee: self.fee,
            change,
            total_selected,
        })
    }
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn pay_to(address: &Address, value: u64) -> TxOutput {
    TxOutput {
        value,
        script_pubkey: address.locking_script(),
        address: address.encode(),
    }
}
