//! Seed management and deterministic key derivation.
//!
//! A wallet is rooted in a single 64-byte seed drawn from the OS RNG. The
//! ML-DSA-87 key pair is regenerated from the seed on demand and the private
//! key is never persisted.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use shadowy_core::constants::SEED_LEN;
use shadowy_core::crypto::KeyPair;

use crate::error::WalletError;

/// A 64-byte wallet seed.
///
/// Secret material is zeroized on drop to prevent leaking key material
/// in freed memory.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    bytes: [u8; SEED_LEN],
}

impl Seed {
    /// Generate a random seed from the OS cryptographic RNG.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; SEED_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Create a seed from raw bytes.
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self { bytes }
    }

    /// Create a seed from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, WalletError> {
        let array: [u8; SEED_LEN] = bytes.try_into().map_err(|_| {
            WalletError::CorruptedRecord(format!(
                "seed must be {SEED_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { bytes: array })
    }

    /// Decode a seed from the base64 form stored in wallet records.
    pub fn from_base64(s: &str) -> Result<Self, WalletError> {
        let mut decoded = BASE64
            .decode(s)
            .map_err(|e| WalletError::CorruptedRecord(format!("seed is not base64: {e}")))?;
        let seed = Self::from_slice(&decoded);
        decoded.zeroize();
        seed
    }

    /// Standard base64 encoding for wallet records.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.bytes)
    }

    /// Get the raw seed bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.bytes
    }

    /// Regenerate the ML-DSA-87 key pair rooted in this seed.
    pub fn key_pair(&self) -> Result<KeyPair, WalletError> {
        Ok(KeyPair::from_seed(&self.bytes)?)
    }
}

impl Clone for Seed {
    fn clone(&self) -> Self {
        Self { bytes: self.bytes }
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
