//! Client error types.

use shadowy_wallet::WalletError;
use thiserror::Error;

/// Failures of the HTTP transport itself (no response was received).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport: {0}")]
    Other(String),
}

/// Errors returned by node queries and the send pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The node could not be reached or did not answer in time.
    #[error("network: {0}")]
    Network(#[from] TransportError),

    /// The node answered with a non-success status.
    #[error("node returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// A success response whose body could not be decoded.
    #[error("decode: {0}")]
    Decode(String),

    /// Invalid client configuration.
    #[error("config: {0}")]
    Config(String),

    /// Wallet-side failure while preparing a transaction.
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl ClientError {
    /// True for failures where the node may have been unreachable rather
    /// than rejecting the request.
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_status() {
        let e = ClientError::Status {
            code: 404,
            body: "not found".into(),
        };
        assert_eq!(e.to_string(), "node returned HTTP 404: not found");
    }

    #[test]
    fn from_transport_error() {
        let e: ClientError = TransportError::Timeout.into();
        assert!(e.is_network());
        assert_eq!(e.to_string(), "network: request timed out");
    }

    #[test]
    fn wallet_error_is_transparent() {
        let e: ClientError = WalletError::NoUtxos.into();
        assert_eq!(e.to_string(), "no UTXOs available");
        assert!(!e.is_network());
    }
}
