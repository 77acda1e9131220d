//! Data model types for uCoin documents.
//!
//! This module contains the in-memory form of every document:
//! - Tokens (public keys, signatures, hashes, block ids, currency names)
//! - The shared envelope and the document traits
//! - Identity documents (self-certification, certification, revocation)
//! - Memberships, peers and their endpoints
//! - Transactions and their inputs/outputs

pub mod certification;
pub mod document;
pub mod membership;
pub mod peer;
pub mod token;
pub mod transaction;

pub use certification::{Certification, Revocation, SelfCertification};
pub use document::{DependentDocument, Document, Envelope};
pub use membership::{Membership, MembershipType};
pub use peer::{ConnectionInfo, Endpoint, KnownApi, KnownEndpoint, Peer, UnknownEndpoint};
pub use token::{BlockId, Currency, HexHash, PublicKey, Signature};
pub use transaction::{
    InputSource, OutputSource, SimpleTransaction, SourceSummary, SourceType, Transaction,
};
