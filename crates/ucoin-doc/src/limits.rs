//! Protocol constants and security limits for parsing untrusted documents.

/// Protocol version emitted by default.
pub const PROTOCOL_VERSION: u32 = 1;

/// Minimum length of a base58 public key.
pub const PUBKEY_MIN_LEN: usize = 43;

/// Maximum length of a base58 public key.
pub const PUBKEY_MAX_LEN: usize = 46;

/// Minimum length of a hex hash (truncated hashes are accepted).
pub const HASH_MIN_LEN: usize = 5;

/// Maximum length of a hex hash.
pub const HASH_MAX_LEN: usize = 40;

/// SHA-1 of the empty string. Certifications anchored on block 0 always use it.
pub const EMPTY_HASH: &str = "DA39A3EE5E6B4B0D3255BFEF95601890AFD80709";

/// Maximum size of a single document accepted by the parsers (bytes).
pub const MAX_DOCUMENT_LEN: usize = 1024 * 1024;

/// Maximum number of endpoints in a peer document.
pub const MAX_ENDPOINTS: usize = 256;

/// Maximum number of issuers in a transaction.
pub const MAX_TX_ISSUERS: usize = 1_000;

/// Maximum number of inputs in a transaction.
pub const MAX_TX_INPUTS: usize = 10_000;

/// Maximum number of outputs in a transaction.
pub const MAX_TX_OUTPUTS: usize = 10_000;

/// Base58 alphabet used by public keys.
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
