//! # shadowy-core
//! Foundation types for the Shadowy wallet engine: address encoding,
//! ML-DSA-87 key material, and the canonical transaction shapes exchanged
//! with a Shadowy node.

pub mod address;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod types;

pub use address::{derive_address, is_valid_address, Address, AddressKind};
pub use crypto::{KeyPair, PublicKey, Signature};
pub use error::{AddressError, CryptoError, TransactionError};
pub use types::{TransactionDraft, TxHash, TxInput, TxOutput, Utxo};
