//! Transaction shapes exchanged with a Shadowy node.
//!
//! All monetary values are in satoshis (1 SHADOW = 10^8 satoshis).
//!
//! The canonical serialization of a [`TransactionDraft`] is compact JSON with
//! fields in declaration order. Those bytes are what gets hashed and signed,
//! so field order and names here are part of the wire format.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::constants::{DEFAULT_LOCKTIME, TX_VERSION};
use crate::error::TransactionError;

/// SHA-256 hash of canonical transaction bytes, rendered as lowercase hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    /// Hash arbitrary bytes with SHA-256.
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a 64-character hex hash.
    pub fn from_hex(s: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(s).map_err(|e| TransactionError::InvalidTxid(e.to_string()))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| TransactionError::InvalidTxid(format!("expected 32 bytes: {s}")))?;
        Ok(Self(array))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for TxHash {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A spendable output as reported by the node.
///
/// The node is authoritative for this data; the engine only reads it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Utxo {
    /// Transaction that created the output.
    pub txid: String,
    /// Index of the output within that transaction.
    pub vout: u32,
    /// Value in satoshis.
    pub value: u64,
    /// Locking script of the output.
    #[serde(default)]
    pub script_pubkey: String,
    /// Address the output pays.
    #[serde(default)]
    pub address: String,
    /// Confirmation depth at the time of the query.
    #[serde(default)]
    pub confirmations: u64,
}

/// A transaction input spending a [`Utxo`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TxInput {
    /// Transaction containing the spent output.
    pub txid: String,
    /// Output index being spent.
    pub vout: u32,
    /// Unlocking script. Empty: authorization is the envelope signature.
    pub script_sig: String,
    /// Input sequence number.
    pub sequence: u32,
}

/// A transaction output paying an address.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TxOutput {
    /// Value in satoshis.
    pub value: u64,
    /// Locking script derived from the recipient address.
    pub script_pubkey: String,
    /// Recipient address in rendered form.
    pub address: String,
}

/// An unsigned transaction in canonical field order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TransactionDraft {
    pub version: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub locktime: u32,
    /// RFC 3339 UTC timestamp with second precision.
    pub timestamp: String,
}

impl TransactionDraft {
    /// Create a draft with the default version and lock time.
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>, timestamp: DateTime<Utc>) -> Self {
        Self {
            version: TX_VERSION,
            inputs,
            outputs,
            locktime: DEFAULT_LOCKTIME,
            timestamp: format_timestamp(timestamp),
        }
    }

    /// Canonical serialization: compact JSON in field declaration order.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        serde_json::to_vec(self).map_err(|e| TransactionError::Serialization(e.to_string()))
    }

    /// Parse a draft back from its canonical bytes.
    pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        serde_json::from_slice(bytes).map_err(|e| TransactionError::Malformed(e.to_string()))
    }

    /// SHA-256 of the canonical bytes.
    pub fn hash(&self) -> Result<TxHash, TransactionError> {
        Ok(TxHash::of(&self.canonical_bytes()?))
    }

    /// Sum of all output values, or `None` on overflow.
    pub fn total_output_value(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.value))
    }
}

/// Render a timestamp the way drafts carry it: `2024-01-02T03:04:05Z`.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    fn sample_draft() -> TransactionDraft {
        TransactionDraft::new(
            vec![TxInput {
                txid: "aa".repeat(32),
                vout: 1,
                script_sig: String::new(),
                sequence: 0xffff_ffff,
            }],
            vec![TxOutput {
                value: 600_000_000,
                script_pubkey: "OP_DUP OP_HASH160 00 OP_EQUALVERIFY OP_CHECKSIG".into(),
                address: "Sdest".into(),
            }],
            fixed_time(),
        )
    }

    // --- Canonical serialization ---

    #[test]
    fn canonical_field_order() {
        let bytes = sample_draft().canonical_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let expected = format!(
            concat!(
                r#"{{"version":1,"inputs":[{{"txid":"{}","vout":1,"script_sig":"","sequence":4294967295}}],"#,
                r#""outputs":[{{"value":600000000,"script_pubkey":"OP_DUP OP_HASH160 00 OP_EQUALVERIFY OP_CHECKSIG","address":"Sdest"}}],"#,
                r#""locktime":0,"timestamp":"2024-01-02T03:04:05Z"}}"#
            ),
            "aa".repeat(32)
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn canonical_bytes_are_stable() {
        let d = sample_draft();
        assert_eq!(d.canonical_bytes().unwrap(), d.clone().canonical_bytes().unwrap());
        assert_eq!(d.hash().unwrap(), d.hash().unwrap());
    }

    #[test]
    fn canonical_roundtrip() {
        let d = sample_draft();
        let bytes = d.canonical_bytes().unwrap();
        let back = TransactionDraft::from_canonical_bytes(&bytes).unwrap();
        assert_eq!(back, d);
        assert_eq!(back.canonical_bytes().unwrap(), bytes);
    }

    #[test]
    fn from_canonical_bytes_rejects_garbage() {
        assert!(matches!(
            TransactionDraft::from_canonical_bytes(b"{not json").unwrap_err(),
            TransactionError::Malformed(_)
        ));
    }

    #[test]
    fn hash_is_sha256_of_canonical_bytes() {
        let d = sample_draft();
        let bytes = d.canonical_bytes().unwrap();
        let expected: [u8; 32] = Sha256::digest(&bytes).into();
        assert_eq!(d.hash().unwrap().0, expected);
    }

    #[test]
    fn hash_changes_with_content() {
        let d1 = sample_draft();
        let mut d2 = sample_draft();
        d2.outputs[0].value += 1;
        assert_ne!(d1.hash().unwrap(), d2.hash().unwrap());
    }

    #[test]
    fn total_output_value_checked() {
        let mut d = sample_draft();
        assert_eq!(d.total_output_value(), Some(600_000_000));
        d.outputs.push(TxOutput {
            value: u64::MAX,
            script_pubkey: String::new(),
            address: String::new(),
        });
        assert_eq!(d.total_output_value(), None);
    }

    // --- TxHash ---

    #[test]
    fn tx_hash_hex_roundtrip() {
        let h = TxHash::of(b"abc");
        let s = h.to_string();
        assert_eq!(s.len(), 64);
        assert_eq!(TxHash::from_hex(&s).unwrap(), h);
        assert_eq!(s.parse::<TxHash>().unwrap(), h);
    }

    #[test]
    fn tx_hash_known_vector() {
        assert_eq!(
            TxHash::of(b"abc").to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn tx_hash_rejects_short() {
        assert!(TxHash::from_hex("abcd").is_err());
        assert!(TxHash::from_hex("zz").is_err());
    }

    #[test]
    fn tx_hash_serde_as_string() {
        let h = TxHash::of(b"abc");
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{h}\""));
        assert_eq!(serde_json::from_str::<TxHash>(&json).unwrap(), h);
    }

    // --- Utxo ---

    #[test]
    fn utxo_parses_node_shape() {
        let json = r#"{"txid":"ab","vout":2,"value":500,"script_pubkey":"s","address":"S1","confirmations":6}"#;
        let u: Utxo = serde_json::from_str(json).unwrap();
        assert_eq!(u.vout, 2);
        assert_eq!(u.value, 500);
        assert_eq!(u.confirmations, 6);
    }

    #[test]
    fn utxo_optional_fields_default() {
        let u: Utxo = serde_json::from_str(r#"{"txid":"ab","vout":0,"value":1}"#).unwrap();
        assert!(u.address.is_empty());
        assert_eq!(u.confirmations, 0);
    }

    #[test]
    fn timestamp_format() {
        assert_eq!(format_timestamp(fixed_time()), "2024-01-02T03:04:05Z");
    }
}
