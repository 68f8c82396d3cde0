//! Address encoding for the Shadowy network.
//!
//! Two address classes share one type:
//! - **Standard** (`S...`, 51 chars): `S` + hex of
//!   `[version 0x42][20-byte SHAKE256 digest of the public key][4-byte checksum]`,
//!   where the checksum is the first 4 bytes of Keccak-256(Keccak-256(version ‖ digest)).
//! - **Liquidity** (`L...`, 41 chars): `L` + hex of a bare 20-byte digest.
//!   Pool addresses are derived from a pool creation hash rather than a key,
//!   so they carry no version byte and no checksum.
//!
//! Validation is syntactic only: a valid address proves nothing about who
//! controls it. Length and prefix are checked before any hashing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Digest, Keccak256, Shake256};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    ADDRESS_CHECKSUM_LEN, ADDRESS_DIGEST_LEN, ADDRESS_PAYLOAD_LEN, ADDRESS_VERSION,
    LIQUIDITY_ADDRESS_LEN, LIQUIDITY_ADDRESS_PREFIX, STANDARD_ADDRESS_LEN,
    STANDARD_ADDRESS_PREFIX,
};
use crate::error::AddressError;

/// Domain tag mixed into liquidity pool address derivation.
const LIQUIDITY_DOMAIN: &str = "L-ADDRESS:";

/// Which address class an [`Address`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// Key-derived address with version byte and checksum (`S...`).
    Standard,
    /// Liquidity pool address, bare digest without checksum (`L...`).
    Liquidity,
}

impl AddressKind {
    /// Leading character of the rendered form.
    pub fn prefix(&self) -> char {
        match self {
            AddressKind::Standard => STANDARD_ADDRESS_PREFIX,
            AddressKind::Liquidity => LIQUIDITY_ADDRESS_PREFIX,
        }
    }

    /// Exact rendered length including the prefix.
    pub fn encoded_len(&self) -> usize {
        match self {
            AddressKind::Standard => STANDARD_ADDRESS_LEN,
            AddressKind::Liquidity => LIQUIDITY_ADDRESS_LEN,
        }
    }

    fn from_prefix(c: char) -> Result<Self, AddressError> {
        match c {
            STANDARD_ADDRESS_PREFIX => Ok(AddressKind::Standard),
            LIQUIDITY_ADDRESS_PREFIX => Ok(AddressKind::Liquidity),
            other => Err(AddressError::InvalidPrefix(other)),
        }
    }
}

/// A Shadowy address: an address class plus the 20-byte digest it names.
///
/// The rendered string is fully determined by these two fields, so two
/// addresses compare equal exactly when their encodings do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    kind: AddressKind,
    digest: [u8; ADDRESS_DIGEST_LEN],
}

impl Address {
    /// Create a standard address from a public-key digest.
    pub fn from_digest(digest: [u8; ADDRESS_DIGEST_LEN]) -> Self {
        Self {
            kind: AddressKind::Standard,
            digest,
        }
    }

    /// Create a standard address from raw public key bytes.
    pub fn from_public_key(public_key: &[u8]) -> Self {
        Self::from_digest(public_key_digest(public_key))
    }

    /// Create a liquidity address from a bare digest.
    pub fn liquidity(digest: [u8; ADDRESS_DIGEST_LEN]) -> Self {
        Self {
            kind: AddressKind::Liquidity,
            digest,
        }
    }

    /// Derive the liquidity address of a pool from its creation transaction hash.
    pub fn liquidity_for_pool(creation_tx_hash: &str) -> Self {
        let mut shake = Shake256::default();
        shake.update(LIQUIDITY_DOMAIN.as_bytes());
        shake.update(creation_tx_hash.as_bytes());
        let mut digest = [0u8; ADDRESS_DIGEST_LEN];
        shake.finalize_xof().read(&mut digest);
        Self::liquidity(digest)
    }

    /// The address class.
    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// The 20-byte digest named by this address.
    pub fn digest(&self) -> &[u8; ADDRESS_DIGEST_LEN] {
        &self.digest
    }

    /// Hex form of the digest, as used in locking scripts.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Encode this address as its presentable string.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.kind.encoded_len());
        out.push(self.kind.prefix());
        match self.kind {
            AddressKind::Standard => out.push_str(&hex::encode(standard_payload(&self.digest))),
            AddressKind::Liquidity => out.push_str(&hex::encode(self.digest)),
        }
        out
    }

    /// Decode and validate an address string.
    pub fn decode(s: &str) -> Result<Self, AddressError> {
        let first = s.chars().next().ok_or(AddressError::Empty)?;
        let kind = AddressKind::from_prefix(first)?;
        if s.len() != kind.encoded_len() {
            return Err(AddressError::InvalidLength(s.len()));
        }

        let body = hex::decode(&s[first.len_utf8()..])
            .map_err(|e| AddressError::InvalidHex(e.to_string()))?;

        let mut digest = [0u8; ADDRESS_DIGEST_LEN];
        match kind {
            AddressKind::Liquidity => {
                digest.copy_from_slice(&body);
            }
            AddressKind::Standard => {
                if body[0] != ADDRESS_VERSION {
                    return Err(AddressError::InvalidVersion(body[0]));
                }
                let (payload, provided) = body.split_at(1 + ADDRESS_DIGEST_LEN);
                if provided != checksum(payload) {
                    return Err(AddressError::InvalidChecksum);
                }
                digest.copy_from_slice(&payload[1..]);
            }
        }

        Ok(Self { kind, digest })
    }

    /// The pay-to-public-key-hash locking script for outputs paying this address.
    pub fn locking_script(&self) -> String {
        format!(
            "OP_DUP OP_HASH160 {} OP_EQUALVERIFY OP_CHECKSIG",
            self.digest_hex()
        )
    }
}

/// Derive the standard address for a public key.
pub fn derive_address(public_key: &[u8]) -> Address {
    Address::from_public_key(public_key)
}

/// Syntactic validity check for either address class.
pub fn is_valid_address(s: &str) -> bool {
    Address::decode(s).is_ok()
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}

// --- Hashing internals ---

/// SHAKE256 of the public key, truncated to the digest length.
fn public_key_digest(public_key: &[u8]) -> [u8; ADDRESS_DIGEST_LEN] {
    let mut shake = Shake256::default();
    shake.update(public_key);
    let mut digest = [0u8; ADDRESS_DIGEST_LEN];
    shake.finalize_xof().read(&mut digest);
    digest
}

/// First 4 bytes of Keccak-256 applied twice.
fn checksum(payload: &[u8]) -> [u8; ADDRESS_CHECKSUM_LEN] {
    let first = Keccak256::digest(payload);
    let second = Keccak256::digest(first);
    let mut out = [0u8; ADDRESS_CHECKSUM_LEN];
    out.copy_from_slice(&second[..ADDRESS_CHECKSUM_LEN]);
    out
}

fn standard_payload(digest: &[u8; ADDRESS_DIGEST_LEN]) -> [u8; ADDRESS_PAYLOAD_LEN] {
    let mut payload = [0u8; ADDRESS_PAYLOAD_LEN];
    payload[0] = ADDRESS_VERSION;
    payload[1..1 + ADDRESS_DIGEST_LEN].copy_from_slice(digest);
    let sum = checksum(&payload[..1 + ADDRESS_DIGEST_LEN]);
    payload[1 + ADDRESS_DIGEST_LEN..].copy_from_slice(&sum);
    payload
}
