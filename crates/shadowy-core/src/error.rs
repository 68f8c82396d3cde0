//! Error types for the Shadowy core primitives.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid length: {0}")] InvalidLength(usize),
    #[error("invalid prefix: {0:?}")] InvalidPrefix(char),
    #[error("empty address")] Empty,
    #[error("invalid hex: {0}")] InvalidHex(String),
    #[error("invalid version: {0:#04x}")] InvalidVersion(u8),
    #[error("invalid checksum")] InvalidChecksum,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid seed length: {0}")] InvalidSeedLength(usize),
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid private key bytes")] InvalidPrivateKey,
    #[error("invalid signature bytes")] InvalidSignature,
    #[error("signature verification failed")] VerificationFailed,
    #[error("key generation failed: {0}")] KeyGeneration(String),
    #[error("signing failed: {0}")] Signing(String),
    #[error("invalid encoding: {0}")] Encoding(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("serialization: {0}")] Serialization(String),
    #[error("malformed transaction: {0}")] Malformed(String),
    #[error("invalid txid: {0}")] InvalidTxid(String),
}
