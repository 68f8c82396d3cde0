//! Wallet error types.

use shadowy_core::error::{AddressError, CryptoError, TransactionError};
use thiserror::Error;

/// Errors that can occur in wallet operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Malformed input or wallet data. Never retried.
    #[error("validation: {0}")]
    Validation(String),

    /// Address failed syntactic validation.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid monetary amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Selected funds do not cover the amount plus fee.
    #[error("insufficient funds: needed {needed}, have {have}")]
    InsufficientFunds {
        /// Required amount in satoshis.
        needed: u64,
        /// Available amount in satoshis.
        have: u64,
    },

    /// No UTXOs available for spending.
    #[error("no UTXOs available")]
    NoUtxos,

    /// The storage collaborator refused a write or remove.
    #[error("storage: {0}")]
    Storage(String),

    /// No record stored under this wallet name.
    #[error("wallet not found: {0}")]
    NotFound(String),

    /// A record already exists under this wallet name.
    #[error("wallet already exists: {0}")]
    AlreadyExists(String),

    /// Migrated legacy wallet without a seed; it cannot sign until re-keyed.
    #[error("wallet {0} was migrated from a legacy record and must be re-keyed")]
    RekeyRequired(String),

    /// Record parsed but its contents are inconsistent.
    #[error("corrupted record: {0}")]
    CorruptedRecord(String),

    /// No wallet is loaded in this session.
    #[error("no active wallet")]
    NoActiveWallet,

    /// Serialization error.
    #[error("serialization: {0}")]
    Serialization(String),

    /// Cryptographic error from shadowy-core.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Transaction encoding error from shadowy-core.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl WalletError {
    /// Amount still missing, for errors that carry one.
    pub fn shortfall(&self) -> Option<u64> {
        match self {
            WalletError::InsufficientFunds { needed, have } => Some(needed.saturating_sub(*have)),
            _ => None,
        }
    }
}

impl From<AddressError> for WalletError {
    fn from(e: AddressError) -> Self {
        WalletError::InvalidAddress(e.to_string())
    }
}
