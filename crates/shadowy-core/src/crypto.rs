//! ML-DSA-87 (FIPS 204) key material for the Shadowy protocol.
//!
//! # Deterministic key generation
//!
//! A key pair is fully determined by a 64-byte wallet seed. The seed is
//! condensed with BLAKE3's key derivation mode into a 32-byte ChaCha20 seed,
//! and ML-DSA-87 key generation draws all of its randomness from that
//! stream. The same seed therefore yields the same key pair in every process,
//! which is what lets a wallet persist only its seed.
//!
//! Signatures cover raw message bytes, with an empty context string.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use fips204::ml_dsa_87;
use fips204::traits::{KeyGen, SerDes, Signer, Verifier};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::fmt;

use crate::address::{derive_address, Address};
use crate::constants::SEED_LEN;
use crate::error::CryptoError;

/// Length of an encoded ML-DSA-87 public key.
pub const PUBLIC_KEY_LEN: usize = ml_dsa_87::PK_LEN;

/// Length of an encoded ML-DSA-87 private key.
pub const PRIVATE_KEY_LEN: usize = ml_dsa_87::SK_LEN;

/// Length of an ML-DSA-87 signature.
pub const SIGNATURE_LEN: usize = ml_dsa_87::SIG_LEN;

/// BLAKE3 KDF context for seed-to-keygen derivation.
const KDF_CONTEXT: &str = "shadowy-wallet 2024 ml-dsa-87 keygen v1";

/// ML-DSA-87 key pair.
///
/// Holds the expanded private key and the encoded public key. The private
/// key never leaves this type in encoded form; it is regenerated from the
/// seed whenever a wallet is loaded.
pub struct KeyPair {
    private_key: ml_dsa_87::PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Deterministically derive a key pair from a 64-byte seed.
    pub fn from_seed(seed: &[u8; SEED_LEN]) -> Result<Self, CryptoError> {
        let rng_seed = blake3::derive_key(KDF_CONTEXT, seed);
        let mut rng = ChaCha20Rng::from_seed(rng_seed);
        let (pk, sk) = ml_dsa_87::KG::try_keygen_with_rng(&mut rng)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        Ok(Self {
            private_key: sk,
            public_key: PublicKey {
                bytes: pk.into_bytes().to_vec(),
            },
        })
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The standard address owned by this key pair.
    pub fn address(&self) -> Address {
        self.public_key.address()
    }

    /// Sign a message, returning a 4,627-byte ML-DSA-87 signature.
    pub fn sign(&self, message: &[u8]) -> Result<Signature, CryptoError> {
        let sig = self
            .private_key
            .try_sign(message, &[])
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        Ok(Signature(sig.to_vec()))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Convenience wrapper around [`KeyPair::from_seed`].
pub fn derive_key_pair(seed: &[u8; SEED_LEN]) -> Result<KeyPair, CryptoError> {
    KeyPair::from_seed(seed)
}

/// Encoded ML-DSA-87 public key (2,592 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Create a public key from its encoded bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; PUBLIC_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        ml_dsa_87::PublicKey::try_from_bytes(array).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Decode a public key from standard base64.
    pub fn from_base64(s: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64
            .decode(s)
            .map_err(|e| CryptoError::Encoding(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Decode a public key from hex.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::Encoding(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Raw encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Standard base64 encoding, as stored in wallet records.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    /// Lowercase hex encoding, as sent to the node.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// The standard address derived from this key.
    pub fn address(&self) -> Address {
        derive_address(&self.bytes)
    }

    /// Verify an ML-DSA-87 signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), CryptoError> {
        let pk_bytes: [u8; PUBLIC_KEY_LEN] = self
            .bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        let pk = ml_dsa_87::PublicKey::try_from_bytes(pk_bytes)
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        let sig: [u8; SIGNATURE_LEN] = signature
            .as_bytes()
            .try_into()
            .map_err(|_| CryptoError::InvalidSignature)?;
        if pk.verify(message, &sig, &[]) {
            Ok(())
        } else {
            Err(CryptoError::VerificationFailed)
        }
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "PublicKey({}...)", &hex[..hex.len().min(16)])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// ML-DSA-87 signature bytes (4,627 bytes).
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Create a signature from raw bytes, checking the length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(CryptoError::InvalidSignature);
        }
        Ok(Self(bytes.to_vec()))
    }

    /// Decode a signature from hex.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::Encoding(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Standard base64 encoding.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({} bytes)", self.0.len())
    }
}
