//! Persisted wallet records and legacy migration.
//!
//! Two on-disk shapes exist:
//! - **V3** ([`WalletRecord`]): base64 seed and public key, ISO-8601 creation time.
//! - **Legacy V2** ([`LegacyWalletRecord`]): raw private key, numeric Unix
//!   creation time.
//!
//! The declared `version` is not trusted. A record is legacy exactly when it
//! carries a non-empty `private_key`; [`classify_wallet_record`] is the only
//! place that decision is made.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use shadowy_core::constants::WALLET_RECORD_VERSION;
use shadowy_core::types::format_timestamp;

use crate::error::WalletError;

/// Current (V3) wallet record.
///
/// A record with an empty `seed` is the product of legacy migration and
/// cannot sign until it is re-keyed.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WalletRecord {
    pub version: u32,
    pub name: String,
    pub address: String,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// Base64 of the 64-byte seed.
    #[serde(default)]
    pub seed: String,
    /// Base64 of the ML-DSA-87 public key.
    #[serde(default)]
    pub public_key: String,
}

impl WalletRecord {
    /// True when the record has no seed and must be re-keyed before signing.
    pub fn requires_rekey(&self) -> bool {
        self.seed.is_empty()
    }

    /// Pretty-printed JSON, the persisted form.
    pub fn to_json(&self) -> Result<Vec<u8>, WalletError> {
        serde_json::to_vec_pretty(self).map_err(|e| WalletError::Serialization(e.to_string()))
    }
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("version", &self.version)
            .field("name", &self.name)
            .field("address", &self.address)
            .field("created_at", &self.created_at)
            .field("seed", &"[REDACTED]")
            .field("public_key_len", &self.public_key.len())
            .finish()
    }
}

/// Creation time as found in legacy records.
///
/// Most legacy records carry a Unix timestamp in (possibly fractional)
/// seconds; records that were hand-edited to V3 shape may carry a string.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum LegacyTimestamp {
    Unix(f64),
    Text(String),
}

impl Default for LegacyTimestamp {
    fn default() -> Self {
        LegacyTimestamp::Unix(0.0)
    }
}

impl LegacyTimestamp {
    /// Normalise to the RFC 3339 form used by V3 records.
    pub fn to_rfc3339(&self) -> String {
        match self {
            LegacyTimestamp::Text(s) => s.clone(),
            LegacyTimestamp::Unix(secs) => {
                let whole = secs.trunc() as i64;
                let nanos = (secs.fract() * 1e9) as u32;
                let ts: DateTime<Utc> = DateTime::from_timestamp(whole, nanos).unwrap_or_default();
                format_timestamp(ts)
            }
        }
    }
}

/// Legacy (V2) wallet record holding a raw private key.
#[derive(Serialize, Deserialize, Clone)]
pub struct LegacyWalletRecord {
    #[serde(default)]
    pub version: u32,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub crypto_type: String,
    pub private_key: String,
    #[serde(default)]
    pub created_at: LegacyTimestamp,
}

impl LegacyWalletRecord {
    /// Upgrade to the V3 shape.
    ///
    /// The raw private key cannot be turned back into a seed, so `seed` and
    /// `public_key` stay empty and the result reports [`WalletRecord::requires_rekey`].
    pub fn migrate(&self) -> WalletRecord {
        WalletRecord {
            version: WALLET_RECORD_VERSION,
            name: self.name.clone(),
            address: self.address.clone(),
            created_at: self.created_at.to_rfc3339(),
            seed: String::new(),
            public_key: String::new(),
        }
    }
}

impl fmt::Debug for LegacyWalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyWalletRecord")
            .field("version", &self.version)
            .field("name", &self.name)
            .field("address", &self.address)
            .field("crypto_type", &self.crypto_type)
            .field("private_key", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A stored record after classification.
#[derive(Debug, Clone)]
pub enum ClassifiedRecord {
    Current(WalletRecord),
    Legacy(LegacyWalletRecord),
}

impl ClassifiedRecord {
    /// Whether the record was written in the legacy layout.
    pub fn is_legacy(&self) -> bool {
        matches!(self, ClassifiedRecord::Legacy(_))
    }

    /// The V3 view of this record, migrating legacy records.
    pub fn into_current(self) -> WalletRecord {
        match self {
            ClassifiedRecord::Current(record) => record,
            ClassifiedRecord::Legacy(legacy) => legacy.migrate(),
        }
    }
}

/// Parse stored bytes and decide which record layout they use.
///
/// Legacy iff `private_key` is present and non-empty, whatever `version` says.
pub fn classify_wallet_record(bytes: &[u8]) -> Result<ClassifiedRecord, WalletError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| WalletError::Validation(format!("malformed wallet data: {e}")))?;

    let is_legacy = value
        .get("private_key")
        .and_then(|v| v.as_str())
        .is_some_and(|s| !s.is_empty());

    if is_legacy {
        let legacy: LegacyWalletRecord = serde_json::from_value(value)
            .map_err(|e| WalletError::Validation(format!("malformed legacy wallet: {e}")))?;
        Ok(ClassifiedRecord::Legacy(legacy))
    } else {
        let current: WalletRecord = serde_json::from_value(value)
            .map_err(|e| WalletError::Validation(format!("malformed wallet: {e}")))?;
        Ok(ClassifiedRecord::Current(current))
    }
}
