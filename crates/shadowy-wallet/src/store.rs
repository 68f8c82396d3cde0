//! Wallet session: create, load, lock and delete named wallets.
//!
//! A [`WalletStore`] owns its storage backend and at most one active
//! [`WalletHandle`]. Mutating operations take `&mut self`, so a session
//! never has two operations racing on the active slot.

use chrono::Utc;
use std::fmt;
use tracing::{debug, info, warn};

use shadowy_core::address::Address;
use shadowy_core::constants::WALLET_RECORD_VERSION;
use shadowy_core::crypto::KeyPair;
use shadowy_core::types::format_timestamp;

use crate::builder::UnsignedTransaction;
use crate::error::WalletError;
use crate::keys::Seed;
use crate::record::{classify_wallet_record, WalletRecord};
use crate::signer::{SignedEnvelope, TransactionSigner};
use crate::storage::{wallet_key, wallet_name_from_key, WalletStorage};

/// Public summary of a wallet, safe to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletInfo {
    pub name: String,
    pub address: String,
    pub created_at: String,
    /// Base64 public key; empty for migrated legacy wallets.
    pub public_key: String,
    /// True when the wallet cannot sign until re-keyed.
    pub requires_rekey: bool,
    /// True when the stored record was in the legacy layout.
    pub migrated: bool,
}

// ---------------------------------------------------------------------------
// WalletHandle
// ---------------------------------------------------------------------------

/// A loaded wallet: its record and, when the record has a seed, the
/// regenerated key pair.
pub struct WalletHandle {
    record: WalletRecord,
    key_pair: Option<KeyPair>,
    migrated: bool,
}

impl WalletHandle {
    /// Open a record, regenerating the key pair from its seed.
    ///
    /// A seeded record whose key does not reproduce the stored address or
    /// public key is rejected as corrupted.
    fn open(record: WalletRecord, migrated: bool) -> Result<Self, WalletError> {
        if record.requires_rekey() {
            return Ok(Self {
                record,
                key_pair: None,
                migrated,
            });
        }

        let seed = Seed::from_base64(&record.seed)?;
        let key_pair = seed.key_pair()?;

        if key_pair.address().encode() != record.address {
            return Err(WalletError::CorruptedRecord(format!(
                "seed of wallet {} does not reproduce its address",
                record.name
            )));
        }
        if !record.public_key.is_empty() && key_pair.public_key().to_base64() != record.public_key {
            return Err(WalletError::CorruptedRecord(format!(
                "seed of wallet {} does not reproduce its public key",
                record.name
            )));
        }

        Ok(Self {
            record,
            key_pair: Some(key_pair),
            migrated,
        })
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// The wallet address in rendered form.
    pub fn address(&self) -> &str {
        &self.record.address
    }

    /// The wallet address, decoded.
    pub fn decoded_address(&self) -> Result<Address, WalletError> {
        Ok(Address::decode(&self.record.address)?)
    }

    pub fn record(&self) -> &WalletRecord {
        &self.record
    }

    pub fn requires_rekey(&self) -> bool {
        self.key_pair.is_none()
    }

    /// The signing key pair; `RekeyRequired` for migrated legacy wallets.
    pub fn key_pair(&self) -> Result<&KeyPair, WalletError> {
        self.key_pair
            .as_ref()
            .ok_or_else(|| WalletError::RekeyRequired(self.record.name.clone()))
    }

    /// Sign a built transaction with this wallet's key.
    pub fn sign(&self, unsigned: &UnsignedTransaction) -> Result<SignedEnvelope, WalletError> {
        TransactionSigner::sign_unsigned(unsigned, self.key_pair()?)
    }

    pub fn info(&self) -> WalletInfo {
        WalletInfo {
            name: self.record.name.clone(),
            address: self.record.address.clone(),
            created_at: self.record.created_at.clone(),
            public_key: self.record.public_key.clone(),
            requires_rekey: self.requires_rekey(),
            migrated: self.migrated,
        }
    }
}

impl fmt::Debug for WalletHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletHandle")
            .field("name", &self.record.name)
            .field("address", &self.record.address)
            .field("requires_rekey", &self.requires_rekey())
            .field("migrated", &self.migrated)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// WalletStore
// ---------------------------------------------------------------------------

/// A wallet session over a storage backend.
pub struct WalletStore<S: WalletStorage> {
    storage: S,
    active: Option<WalletHandle>,
}

impl<S: WalletStorage> WalletStore<S> {
    /// Open a session with no active wallet.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            active: None,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The active wallet, if any.
    pub fn active(&self) -> Option<&WalletHandle> {
        self.active.as_ref()
    }

    /// The active wallet, or `NoActiveWallet`.
    pub fn require_active(&self) -> Result<&WalletHandle, WalletError> {
        self.active.as_ref().ok_or(WalletError::NoActiveWallet)
    }

    /// Create a wallet with a fresh seed, persist it, and make it active.
    ///
    /// On a storage failure the previous active wallet is left in place.
    pub fn create(&mut self, name: &str) -> Result<WalletInfo, WalletError> {
        validate_name(name)?;
        if self.storage.read(&wallet_key(name)).is_some() {
            return Err(WalletError::AlreadyExists(name.to_string()));
        }
        let handle = self.persist_fresh(name)?;
        let info = handle.info();
        info!(wallet = %info.name, address = %info.address, "wallet created");
        self.active = Some(handle);
        Ok(info)
    }

    /// Load a stored wallet and make it active, migrating legacy records.
    ///
    /// On failure the previous active wallet is left in place.
    pub fn load(&mut self, name: &str) -> Result<WalletInfo, WalletError> {
        validate_name(name)?;
        let bytes = self
            .storage
            .read(&wallet_key(name))
            .ok_or_else(|| WalletError::NotFound(name.to_string()))?;

        let classified = classify_wallet_record(&bytes)?;
        let migrated = classified.is_legacy();
        if migrated {
            warn!(wallet = name, "legacy wallet record migrated; re-key required before signing");
        }

        let handle = WalletHandle::open(classified.into_current(), migrated)?;
        let info = handle.info();
        info!(wallet = %info.name, address = %info.address, migrated, "wallet loaded");
        self.active = Some(handle);
        Ok(info)
    }

    /// Clear the active slot without touching storage.
    pub fn lock(&mut self) {
        if let Some(handle) = self.active.take() {
            debug!(wallet = handle.name(), "wallet locked");
        }
    }

    /// Remove a stored wallet, locking the session if it was active.
    ///
    /// Returns `false` for names that could never have been created.
    pub fn delete(&mut self, name: &str) -> bool {
        if let Err(e) = validate_name(name) {
            debug!(error = %e, "delete refused");
            return false;
        }
        let removed = self.storage.remove(&wallet_key(name));
        if self.active.as_ref().is_some_and(|h| h.name() == name) {
            self.lock();
        }
        if removed {
            info!(wallet = name, "wallet deleted");
        }
        removed
    }

    /// Names of all stored wallets, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .storage
            .keys()
            .iter()
            .filter_map(|k| wallet_name_from_key(k))
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }

    /// Replace a wallet that cannot sign with a freshly seeded record of the
    /// same name and make it active.
    ///
    /// Only records that require a re-key (migrated legacy wallets) are
    /// replaced. A seeded wallet is refused with `Validation` and left
    /// untouched, since its seed is the only way to spend its funds. Funds
    /// held by the old address are not moved.
    pub fn rekey(&mut self, name: &str) -> Result<WalletInfo, WalletError> {
        validate_name(name)?;
        let old = self
            .storage
            .read(&wallet_key(name))
            .ok_or_else(|| WalletError::NotFound(name.to_string()))?;
        let old = classify_wallet_record(&old)?.into_current();
        if !old.requires_rekey() {
            return Err(WalletError::Validation(format!(
                "wallet {name} has a seed; re-keying would make its funds unspendable"
            )));
        }

        let handle = self.persist_fresh(name)?;
        let info = handle.info();
        info!(
            wallet = %info.name,
            old_address = %old.address,
            address = %info.address,
            "wallet re-keyed"
        );
        self.active = Some(handle);
        Ok(info)
    }

    fn persist_fresh(&mut self, name: &str) -> Result<WalletHandle, WalletError> {
        let seed = Seed::generate();
        let key_pair = seed.key_pair()?;
        let record = WalletRecord {
            version: WALLET_RECORD_VERSION,
            name: name.to_string(),
            address: key_pair.address().encode(),
            created_at: format_timestamp(Utc::now()),
            seed: seed.to_base64(),
            public_key: key_pair.public_key().to_base64(),
        };

        let bytes = record.to_json()?;
        if !self.storage.write(&wallet_key(name), &bytes) {
            return Err(WalletError::Storage(format!("failed to persist wallet {name}")));
        }

        Ok(WalletHandle {
            record,
            key_pair: Some(key_pair),
            migrated: false,
        })
    }
}

fn validate_name(name: &str) -> Result<(), WalletError> {
    if name.trim().is_empty() {
        return Err(WalletError::Validation("wallet name must not be empty".into()));
    }
    if name.contains(['/', '\\']) || name.starts_with('.') || name.chars().any(char::is_control) {
        return Err(WalletError::Validation(format!("invalid wallet name: {name:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};
    use shadowy_core::address::is_valid_address;
    use shadowy_core::constants::STANDARD_ADDRESS_LEN;

    fn store() -> WalletStore<MemoryStorage> {
        WalletStore::new(MemoryStorage::new())
    }

    const LEGACY_V2: &str = r#"{"version":2,"name":"old","address":"Sold","crypto_type":"ML-DSA-87","private_key":"deadbeef","created_at":1700000000}"#;

    #[test]
    fn create_sets_active_and_persists() {
        let mut s = store();
        let info = s.create("alice").unwrap();
        assert_eq!(info.name, "alice");
        assert_eq!(info.address.len(), STANDARD_ADDRESS_LEN);
        assert!(info.address.starts_with('S'));
        assert!(is_valid_address(&info.address));
        assert!(!info.requires_rekey);
        assert!(!info.migrated);

        let active = s.active().unwrap();
        assert_eq!(active.name(), "alice");
        assert_eq!(active.address(), info.address);
        assert!(s.storage().read("shadowy-wallet-alice.json").is_some());
    }

    #[test]
    fn create_refuses_overwrite() {
        let mut s = store();
        s.create("alice").unwrap();
        assert_eq!(
            s.create("alice").unwrap_err(),
            WalletError::AlreadyExists("alice".into())
        );
    }

    #[test]
    fn create_rejects_bad_names() {
        let mut s = store();
        for name in ["", "  ", "a/b", "a\\b", "..", ".hidden"] {
            assert!(
                matches!(s.create(name), Err(WalletError::Validation(_))),
                "accepted {name:?}"
            );
        }
    }

    #[test]
    fn create_with_failing_storage_sets_nothing_active() {
        let mut s = WalletStore::new(MemoryStorage::failing());
        assert!(matches!(s.create("alice"), Err(WalletError::Storage(_))));
        assert!(s.active().is_none());
    }

    #[test]
    fn load_roundtrip_reproduces_keys() {
        let mut s = store();
        let created = s.create("alice").unwrap();
        s.lock();
        assert!(s.active().is_none());

        let loaded = s.load("alice").unwrap();
        assert_eq!(loaded, created);
        let handle = s.active().unwrap();
        assert_eq!(handle.key_pair().unwrap().public_key().to_base64(), created.public_key);
    }

    #[test]
    fn load_missing_is_not_found() {
        let mut s = store();
        assert_eq!(s.load("ghost").unwrap_err(), WalletError::NotFound("ghost".into()));
    }

    #[test]
    fn load_malformed_is_validation() {
        let mut storage = MemoryStorage::new();
        storage.insert_raw(&wallet_key("bad"), b"{oops");
        let mut s = WalletStore::new(storage);
        assert!(matches!(s.load("bad"), Err(WalletError::Validation(_))));
    }

    #[test]
    fn load_legacy_requires_rekey() {
        let mut storage = MemoryStorage::new();
        storage.insert_raw(&wallet_key("old"), LEGACY_V2.as_bytes());
        let mut s = WalletStore::new(storage);

        let info = s.load("old").unwrap();
        assert!(info.migrated);
        assert!(info.requires_rekey);
        assert_eq!(info.created_at, "2023-11-14T22:13:20Z");

        let handle = s.active().unwrap();
        assert_eq!(
            handle.key_pair().unwrap_err(),
            WalletError::RekeyRequired("old".into())
        );
    }

    #[test]
    fn rekey_replaces_legacy_wallet() {
        let mut storage = MemoryStorage::new();
        storage.insert_raw(&wallet_key("old"), LEGACY_V2.as_bytes());
        let mut s = WalletStore::new(storage);
        s.load("old").unwrap();

        let info = s.rekey("old").unwrap();
        assert!(!info.requires_rekey);
        assert!(is_valid_address(&info.address));
        assert!(s.active().unwrap().key_pair().is_ok());

        s.lock();
        let reloaded = s.load("old").unwrap();
        assert!(!reloaded.migrated);
        assert_eq!(reloaded.address, info.address);
    }

    #[test]
    fn rekey_missing_is_not_found() {
        let mut s = store();
        assert!(matches!(s.rekey("nobody"), Err(WalletError::NotFound(_))));
    }

    #[test]
    fn rekey_refuses_seeded_wallet() {
        let mut s = store();
        let created = s.create("alice").unwrap();
        let before = s.storage().read(&wallet_key("alice")).unwrap();

        assert!(matches!(s.rekey("alice"), Err(WalletError::Validation(_))));
        assert_eq!(s.storage().read(&wallet_key("alice")).unwrap(), before);

        s.lock();
        let reloaded = s.load("alice").unwrap();
        assert_eq!(reloaded.address, created.address);
        assert_eq!(reloaded.public_key, created.public_key);
    }

    #[test]
    fn rekey_malformed_record_is_validation() {
        let mut storage = MemoryStorage::new();
        storage.insert_raw(&wallet_key("bad"), b"{oops");
        let mut s = WalletStore::new(storage);
        assert!(matches!(s.rekey("bad"), Err(WalletError::Validation(_))));
        assert_eq!(s.storage().read(&wallet_key("bad")).unwrap(), b"{oops".to_vec());
        assert!(s.active().is_none());
    }

    #[test]
    fn load_detects_seed_address_mismatch() {
        let mut s = store();
        s.create("alice").unwrap();
        let bytes = s.storage().read(&wallet_key("alice")).unwrap();
        let mut record: WalletRecord = serde_json::from_slice(&bytes).unwrap();
        record.address = Address::from_digest([9; 20]).encode();

        let mut storage = MemoryStorage::new();
        storage.insert_raw(&wallet_key("alice"), &record.to_json().unwrap());
        let mut s = WalletStore::new(storage);
        assert!(matches!(s.load("alice"), Err(WalletError::CorruptedRecord(_))));
    }

    #[test]
    fn failed_load_keeps_previous_active() {
        let mut s = store();
        s.create("alice").unwrap();
        assert!(s.load("ghost").is_err());
        assert_eq!(s.active().unwrap().name(), "alice");
    }

    #[test]
    fn delete_locks_active_wallet() {
        let mut s = store();
        s.create("alice").unwrap();
        assert!(s.delete("alice"));
        assert!(s.active().is_none());
        assert!(!s.delete("alice"));
        assert!(s.list().is_empty());
    }

    #[test]
    fn delete_rejects_invalid_names() {
        let mut storage = MemoryStorage::new();
        storage.insert_raw("shadowy-wallet-.hidden.json", b"{}");
        let mut s = WalletStore::new(storage);
        for name in ["", ".hidden", "../alice", "a\\b"] {
            assert!(!s.delete(name), "deleted {name:?}");
        }
        assert!(s.storage().read("shadowy-wallet-.hidden.json").is_some());
    }

    #[test]
    fn delete_other_wallet_keeps_active() {
        let mut s = store();
        s.create("alice").unwrap();
        s.create("bob").unwrap();
        s.load("alice").unwrap();
        assert!(s.delete("bob"));
        assert_eq!(s.active().unwrap().name(), "alice");
    }

    #[test]
    fn list_only_wallet_keys() {
        let mut storage = MemoryStorage::new();
        storage.insert_raw("unrelated.txt", b"x");
        let mut s = WalletStore::new(storage);
        s.create("bob").unwrap();
        s.create("alice").unwrap();
        assert_eq!(s.list(), vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn require_active_without_wallet() {
        let s = store();
        assert_eq!(s.require_active().unwrap_err(), WalletError::NoActiveWallet);
    }

    #[test]
    fn file_storage_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = WalletStore::new(FileStorage::new(dir.path()));
        let created = s.create("disk").unwrap();
        drop(s);

        let mut s = WalletStore::new(FileStorage::new(dir.path()));
        assert_eq!(s.list(), vec!["disk".to_string()]);
        assert_eq!(s.load("disk").unwrap().address, created.address);
    }

    #[test]
    fn handle_debug_hides_key_material() {
        let mut s = store();
        s.create("alice").unwrap();
        let debug = format!("{:?}", s.active().unwrap());
        assert!(debug.contains("alice"));
        assert!(!debug.contains("seed"));
    }
}
