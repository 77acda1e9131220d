//! Validated token types shared by all documents.
//!
//! Each type can only be constructed through its grammar rule, so a value in
//! hand is always well-formed. Tokens keep the exact text they were parsed
//! from, which keeps re-serialization byte-identical.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GrammarError;
use crate::grammar::{parse_uint, validate_currency, validate_hash, validate_pubkey, validate_signature};
use crate::limits::EMPTY_HASH;

macro_rules! string_token {
    ($(#[$meta:meta])* $name:ident, $validate:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validates and wraps the token.
            pub fn new(token: impl Into<String>) -> Result<Self, GrammarError> {
                let token = token.into();
                $validate(&token)?;
                Ok(Self(token))
            }

            /// Returns the token text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = GrammarError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = GrammarError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(token: $name) -> String {
                token.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_token!(
    /// A base58 Ed25519 public key.
    PublicKey,
    validate_pubkey
);

string_token!(
    /// A base64 signature as it appears in documents.
    Signature,
    validate_signature
);

string_token!(
    /// A hex hash (block hash or transaction fingerprint), 5 to 40 chars.
    HexHash,
    validate_hash
);

string_token!(
    /// The name of the currency a document targets.
    Currency,
    validate_currency
);

impl HexHash {
    /// The SHA-1 of the empty string.
    pub fn empty() -> Self {
        Self(EMPTY_HASH.to_string())
    }
}

/// A reference to a block: `NUMBER-HASH`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockId {
    pub number: u64,
    pub hash: HexHash,
}

impl BlockId {
    /// Creates a block id from its parts.
    pub fn new(number: u64, hash: HexHash) -> Self {
        Self { number, hash }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.number, self.hash)
    }
}

impl FromStr for BlockId {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GrammarError::BlockId {
            token: s.to_string(),
        };
        let (number, hash) = s.split_once('-').ok_or_else(invalid)?;
        let number = parse_uint(number, "block number").map_err(|_| invalid())?;
        let hash = HexHash::new(hash).map_err(|_| invalid())?;
        Ok(Self { number, hash })
    }
}

impl TryFrom<String> for BlockId {
    type Error = GrammarError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BlockId> for String {
    fn from(id: BlockId) -> String {
        id.to_string()
    }
}
