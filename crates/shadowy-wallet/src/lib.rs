//! # shadowy-wallet: seed-rooted ML-DSA-87 wallet for Shadowy.
//!
//! Provides deterministic key material from a 64-byte seed, versioned wallet
//! records with legacy migration, pluggable record storage, largest-first
//! coin selection, canonical transaction building, and envelope signing.
//!
//! # Modules
//!
//! - [`error`]: `WalletError` enum
//! - [`keys`]: 64-byte `Seed` and key pair derivation
//! - [`record`]: V3 wallet record, legacy V2 record, `classify_wallet_record`
//! - [`storage`]: `WalletStorage` collaborator, file and in-memory backends
//! - [`store`]: `WalletStore` session holding the active wallet
//! - [`coin_selection`]: Largest-first UTXO selection
//! - [`builder`]: Transaction builder producing canonical drafts
//! - [`signer`]: `SignedEnvelope` creation and verification

pub mod builder;
pub mod coin_selection;
pub mod error;
pub mod keys;
pub mod record;
pub mod signer;
pub mod storage;
pub mod store;

// Re-exports for convenient access
pub use builder::{TransactionBuilder, UnsignedTransaction};
pub use coin_selection::{CoinSelection, CoinSelector};
pub use error::WalletError;
pub use keys::Seed;
pub use record::{classify_wallet_record, ClassifiedRecord, LegacyWalletRecord, WalletRecord};
pub use signer::{EnvelopeHeader, SignedEnvelope, TransactionSigner, WireEnvelope};
pub use storage::{FileStorage, MemoryStorage, WalletStorage};
pub use store::{WalletHandle, WalletInfo, WalletStore};
