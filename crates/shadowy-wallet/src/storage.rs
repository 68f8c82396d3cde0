//! Storage collaborator for wallet records.
//!
//! The engine only needs a flat byte store keyed by string. Records live
//! under `shadowy-wallet-<name>.json`; no concurrent-writer protocol is
//! assumed and the last writer wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use shadowy_core::constants::{WALLET_KEY_PREFIX, WALLET_KEY_SUFFIX};
use tracing::{debug, warn};

/// Host-supplied key-value persistence.
pub trait WalletStorage {
    /// Store `bytes` under `key`, returning false on failure.
    fn write(&mut self, key: &str, bytes: &[u8]) -> bool;

    /// Read the bytes stored under `key`, if any.
    fn read(&self, key: &str) -> Option<Vec<u8>>;

    /// Remove `key`, returning false if nothing was removed.
    fn remove(&mut self, key: &str) -> bool;

    /// All keys currently stored.
    fn keys(&self) -> Vec<String>;
}

/// Storage key for a wallet name.
pub fn wallet_key(name: &str) -> String {
    format!("{WALLET_KEY_PREFIX}{name}{WALLET_KEY_SUFFIX}")
}

/// Inverse of [`wallet_key`]; `None` for keys outside the wallet namespace.
pub fn wallet_name_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(WALLET_KEY_PREFIX)?
        .strip_suffix(WALLET_KEY_SUFFIX)
        .filter(|name| !name.is_empty())
}

// ---------------------------------------------------------------------------
// File-backed storage
// ---------------------------------------------------------------------------

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Store files under `dir`, created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default wallet directory: `~/.shadowy`.
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".shadowy")
    }

    /// The directory holding the files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Default for FileStorage {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl WalletStorage for FileStorage {
    fn write(&mut self, key: &str, bytes: &[u8]) -> bool {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %e, "failed to create wallet directory");
            return false;
        }
        let path = self.path_for(key);
        if let Err(e) = std::fs::write(&path, bytes) {
            warn!(path = %path.display(), error = %e, "failed to write wallet file");
            return false;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)) {
                warn!(path = %path.display(), error = %e, "failed to restrict wallet file permissions");
            }
        }
        debug!(path = %path.display(), len = bytes.len(), "wallet file written");
        true
    }

    fn read(&self, key: &str) -> Option<Vec<u8>> {
        std::fs::read(self.path_for(key)).ok()
    }

    fn remove(&mut self, key: &str) -> bool {
        std::fs::remove_file(self.path_for(key)).is_ok()
    }

    fn keys(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut keys: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        keys.sort();
        keys
    }
}

// ---------------------------------------------------------------------------
// In-memory storage
// ---------------------------------------------------------------------------

/// Map-backed storage for tests and embedding.
///
/// `fail_writes` simulates a host that refuses to persist.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: BTreeMap<String, Vec<u8>>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail.
    pub fn failing() -> Self {
        Self {
            entries: BTreeMap::new(),
            fail_writes: true,
        }
    }

    /// Insert raw bytes directly, bypassing `fail_writes`.
    pub fn insert_raw(&mut self, key: &str, bytes: &[u8]) {
        self.entries.insert(key.to_string(), bytes.to_vec());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl WalletStorage for MemoryStorage {
    fn write(&mut self, key: &str, bytes: &[u8]) -> bool {
        if self.fail_writes {
            return false;
        }
        self.entries.insert(key.to_string(), bytes.to_vec());
        true
    }

    fn read(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_key_format() {
        assert_eq!(wallet_key("alice"), "shadowy-wallet-alice.json");
    }

    #[test]
    fn wallet_name_from_key_roundtrip() {
        assert_eq!(wallet_name_from_key(&wallet_key("bob")), Some("bob"));
        assert_eq!(wallet_name_from_key("other.json"), None);
        assert_eq!(wallet_name_from_key("shadowy-wallet-.json"), None);
        assert_eq!(wallet_name_from_key("shadowy-wallet-x.txt"), None);
    }

    #[test]
    fn memory_write_read_remove() {
        let mut s = MemoryStorage::new();
        assert!(s.is_empty());
        assert!(s.write("k", b"v"));
        assert_eq!(s.read("k"), Some(b"v".to_vec()));
        assert_eq!(s.keys(), vec!["k".to_string()]);
        assert!(s.remove("k"));
        assert!(!s.remove("k"));
        assert_eq!(s.read("k"), None);
    }

    #[test]
    fn memory_last_writer_wins() {
        let mut s = MemoryStorage::new();
        s.write("k", b"one");
        s.write("k", b"two");
        assert_eq!(s.read("k"), Some(b"two".to_vec()));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn memory_failing_refuses_writes() {
        let mut s = MemoryStorage::failing();
        assert!(!s.write("k", b"v"));
        assert_eq!(s.read("k"), None);
    }

    #[test]
    fn file_write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = FileStorage::new(dir.path().join("wallets"));
        assert!(s.keys().is_empty());
        assert!(s.write("shadowy-wallet-a.json", b"{}"));
        assert_eq!(s.read("shadowy-wallet-a.json"), Some(b"{}".to_vec()));
        assert_eq!(s.keys(), vec!["shadowy-wallet-a.json".to_string()]);
        assert!(s.remove("shadowy-wallet-a.json"));
        assert_eq!(s.read("shadowy-wallet-a.json"), None);
    }

    #[cfg(unix)]
    #[test]
    fn file_permissions_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let mut s = FileStorage::new(dir.path());
        s.write("k", b"secret");
        let mode = std::fs::metadata(dir.path().join("k")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn file_write_into_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a dir").unwrap();
        let mut s = FileStorage::new(blocker.join("nested"));
        assert!(!s.write("k", b"v"));
    }

    #[test]
    fn default_dir_ends_with_shadowy() {
        assert!(FileStorage::default_dir().ends_with(".shadowy"));
    }
}
