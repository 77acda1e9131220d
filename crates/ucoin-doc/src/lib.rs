//! uCoin documents: parsing, validation and serialization of the line-based
//! protocol documents exchanged between nodes of a uCoin currency.
//!
//! # Overview
//!
//! Every document has a raw form (the exact bytes that get signed), a
//! signed-raw form (raw followed by signature lines) and, for some kinds, a
//! one-line inline form or a multi-line compact form used inside blocks.
//! Parsing any form and serializing it back yields the same text.
//!
//! Supported documents:
//! - **Identities**: self-certification, certification, revocation
//! - **Memberships**: IN/OUT requests
//! - **Peers**: node reachability with API endpoints
//! - **Transactions**: multi-issuer money transfers
//!
//! # Quick Start
//!
//! ```rust
//! use ucoin_doc::{Document, Membership};
//!
//! let text = "Version: 1
//! Type: Membership
//! Currency: beta_brousouf
//! Issuer: HsLShAtzXTVxeUtQd7yi5Z5Zh4zNvbu8sTEZ53nfKcqY
//! Block: 0-DA39A3EE5E6B4B0D3255BFEF95601890AFD80709
//! Membership: IN
//! UserID: cat
//! CertTS: 1409990782
//! SIG
//! ";
//!
//! let membership = Membership::from_signed_raw(text).unwrap();
//! assert_eq!(membership.uid(), "cat");
//! assert_eq!(membership.signed_raw(), text);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Document types and tokens
//! - [`codec`]: Raw, signed-raw, inline and compact forms
//! - [`grammar`]: Token-level validation
//! - [`signer`]: Signing abstraction and an Ed25519 implementation
//! - [`transport`]: Hand-off of signed documents to a network layer
//! - [`error`]: Error types
//! - [`limits`]: Protocol constants and security limits
//!
//! # Security
//!
//! The parsers are designed to safely handle untrusted input:
//! - Document size and section lengths are bounded
//! - Counts declared in compact headers are checked against the lines present
//! - Errors carry the 1-based line where parsing stopped
//!
//! Signatures are produced through [`Signer`] but never verified here.
//!
//! # Wire Format
//!
//! Documents are UTF-8 text, one field per line, each line terminated by
//! `\n`. The signed payload must be ASCII.

pub mod codec;
pub mod error;
pub mod grammar;
pub mod limits;
pub mod model;
pub mod signer;
pub mod transport;

// Re-export commonly used types at crate root
pub use codec::ParseOptions;
pub use error::{
    Error, ErrorCode, GrammarError, InvariantViolation, ParseError, ParseErrorKind, SigningError,
};
pub use model::{
    BlockId, Certification, ConnectionInfo, Currency, DependentDocument, Document, Endpoint,
    Envelope, HexHash, InputSource, KnownApi, KnownEndpoint, Membership, MembershipType,
    OutputSource, Peer, PublicKey, Revocation, SelfCertification, Signature, SimpleTransaction,
    SourceSummary, SourceType, Transaction, UnknownEndpoint,
};
pub use signer::{Ed25519Signer, Signer};
pub use transport::{Submission, SubmissionKind, Transport};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
