//! Text encoding/decoding for uCoin documents.
//!
//! Every document has a raw form (the signed payload) and a signed-raw form
//! (raw plus one signature per line). Identity documents and memberships also
//! have a single-line inline form; transactions have a multi-line compact form.

pub mod certification;
pub mod header;
pub mod membership;
pub mod peer;
pub mod primitives;
pub mod transaction;

pub use primitives::{DocWriter, LineReader};

use crate::limits::MAX_DOCUMENT_LEN;

/// Options for parsing untrusted documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum accepted document length in bytes.
    pub max_document_len: usize,

    /// Protocol version the document must declare.
    ///
    /// `None` accepts any version.
    pub expected_version: Option<u32>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_document_len: MAX_DOCUMENT_LEN,
            expected_version: None,
        }
    }
}

impl ParseOptions {
    /// Creates default options: standard length limit, any version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that reject documents of any other protocol version.
    pub fn strict(version: u32) -> Self {
        Self {
            expected_version: Some(version),
            ..Self::default()
        }
    }
}
