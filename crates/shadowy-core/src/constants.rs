//! Protocol constants. All monetary values in satoshis (1 SHADOW = 10^8 satoshis).

pub const COIN: u64 = 100_000_000;

/// Default transaction fee in satoshis (0.001 SHADOW).
pub const DEFAULT_FEE: u64 = 100_000;

/// Version byte prefixed to the public-key digest of a standard address.
pub const ADDRESS_VERSION: u8 = 0x42;

/// Length of the public-key digest carried by every address.
pub const ADDRESS_DIGEST_LEN: usize = 20;

/// Length of the double-Keccak-256 checksum on standard addresses.
pub const ADDRESS_CHECKSUM_LEN: usize = 4;

/// Raw standard address payload: version + digest + checksum.
pub const ADDRESS_PAYLOAD_LEN: usize = 1 + ADDRESS_DIGEST_LEN + ADDRESS_CHECKSUM_LEN;

/// Rendered length of a standard (`S`) address: prefix + 50 hex chars.
pub const STANDARD_ADDRESS_LEN: usize = 1 + 2 * ADDRESS_PAYLOAD_LEN;

/// Rendered length of a liquidity (`L`) address: prefix + 40 hex chars.
pub const LIQUIDITY_ADDRESS_LEN: usize = 1 + 2 * ADDRESS_DIGEST_LEN;

/// Prefix character of standard key-derived addresses.
pub const STANDARD_ADDRESS_PREFIX: char = 'S';

/// Prefix character of liquidity pool addresses.
pub const LIQUIDITY_ADDRESS_PREFIX: char = 'L';

/// Transaction format version produced by the builder.
pub const TX_VERSION: u32 = 1;

/// Sequence number written into every input (final, no replacement).
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// Lock time written into every transaction.
pub const DEFAULT_LOCKTIME: u32 = 0;

/// Signature algorithm identifier carried in envelopes and headers.
pub const ALGORITHM_ID: &str = "ML-DSA-87";

/// JOSE-style header type advertised alongside the algorithm.
pub const ENVELOPE_TYPE: &str = "JWT";

/// Length of the wallet seed that roots a key pair.
pub const SEED_LEN: usize = 64;

/// Current wallet record format version.
pub const WALLET_RECORD_VERSION: u32 = 3;

/// Namespace prefix for persisted wallet records.
pub const WALLET_KEY_PREFIX: &str = "shadowy-wallet-";

/// Suffix for persisted wallet records.
pub const WALLET_KEY_SUFFIX: &str = ".json";

/// Default node API base URL.
pub const DEFAULT_NODE_URL: &str = "http://127.0.0.1:8080/api/v1";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
