//! Error types for document parsing, construction and signing.

use thiserror::Error;

/// Error categories, used to group failures when scanning batches of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A single token failed its field rule.
    Grammar,
    /// The document layout is wrong (labels, sections, counts, truncation).
    Structure,
    /// The fields are well-formed but violate a cross-field invariant.
    Invariant,
    /// The document exceeds configured limits or targets another protocol version.
    Limit,
}

impl ErrorCode {
    /// Returns a short stable label (e.g., "grammar").
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCode::Grammar => "grammar",
            ErrorCode::Structure => "structure",
            ErrorCode::Invariant => "invariant",
            ErrorCode::Limit => "limit",
        }
    }
}

/// A token failed its grammar rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("invalid public key {token:?}: expected 43-46 base58 characters")]
    PublicKey { token: String },

    #[error("invalid signature {token:?}: expected base64")]
    Signature { token: String },

    #[error("invalid hash {token:?}: expected 5-40 hex characters")]
    Hash { token: String },

    #[error("invalid block id {token:?}: expected NUMBER-HASH")]
    BlockId { token: String },

    #[error("invalid {field} {token:?}: expected unsigned decimal digits")]
    Integer { field: &'static str, token: String },

    #[error("invalid uid {token:?}: must be non-empty without line breaks")]
    Uid { token: String },

    #[error("invalid currency {token:?}: must be non-empty without line breaks")]
    Currency { token: String },

    #[error("invalid comment: must not contain line breaks")]
    Comment,

    #[error("invalid source type {token:?}: expected D or T")]
    SourceType { token: String },

    #[error("invalid membership type {token:?}: expected IN or OUT")]
    MembershipType { token: String },

    #[error("invalid endpoint {token:?}: {reason}")]
    Endpoint { token: String, reason: &'static str },
}

/// What went wrong while parsing a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected `{expected}`, found {found:?}")]
    UnexpectedField { expected: &'static str, found: String },

    #[error("{section} declares {declared} entries but {actual} were found")]
    CountMismatch {
        section: &'static str,
        declared: usize,
        actual: usize,
    },

    #[error("input ended while reading {expected}")]
    Truncated { expected: &'static str },

    #[error("malformed {context}: {reason}")]
    Malformed { context: &'static str, reason: String },

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error("document length {len} exceeds maximum {max}")]
    TooLarge { len: usize, max: usize },

    #[error("{section} has more than {max} entries")]
    SectionTooLarge { section: &'static str, max: usize },

    #[error("unsupported protocol version {found} (expected {expected})")]
    UnsupportedVersion { expected: u32, found: u32 },
}

/// Error while parsing a textual document.
///
/// `position` is the 1-based line number the parser was looking at. Inline
/// forms are single-line, so their errors always report line 1.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {position}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: usize,
}

impl ParseError {
    /// Creates a parse error at the given line.
    pub fn new(kind: impl Into<ParseErrorKind>, position: usize) -> Self {
        Self {
            kind: kind.into(),
            position,
        }
    }

    /// Returns the error category.
    pub fn code(&self) -> ErrorCode {
        match &self.kind {
            ParseErrorKind::Grammar(_) => ErrorCode::Grammar,
            ParseErrorKind::Invariant(_) => ErrorCode::Invariant,
            ParseErrorKind::TooLarge { .. }
            | ParseErrorKind::SectionTooLarge { .. }
            | ParseErrorKind::UnsupportedVersion { .. } => ErrorCode::Limit,
            _ => ErrorCode::Structure,
        }
    }
}

/// A constructed document would violate one of its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{document} carries {actual} signatures but has {expected} issuers")]
    SignatureCountMismatch {
        document: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{document} accepts at most one signature, got {actual}")]
    TooManySignatures { document: &'static str, actual: usize },

    #[error("{document} is not signed")]
    MissingSignature { document: &'static str },

    #[error("transaction has no issuers")]
    NoIssuers,

    #[error("transaction has no inputs")]
    NoInputs,

    #[error("transaction has no outputs")]
    NoOutputs,

    #[error("input {position} references issuer {index} but only {issuers} issuers exist")]
    InputIndexOutOfRange {
        position: usize,
        index: usize,
        issuers: usize,
    },

    #[error("{section} holds {actual} entries, limit is {max}")]
    SectionTooLarge {
        section: &'static str,
        actual: usize,
        max: usize,
    },

    #[error("simple transaction requires exactly one issuer and one input, got {issuers} and {inputs}")]
    NotSimple { issuers: usize, inputs: usize },

    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

/// Error raised by a [`Signer`](crate::signer::Signer) implementation.
pub type SignerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error during the signing workflow.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("signer failed")]
    Signer(#[source] SignerError),

    #[error("payload contains non-ASCII byte at offset {offset}")]
    NonAsciiPayload { offset: usize },
}

/// Any failure produced by operations spanning several stages (e.g. signing a
/// document and installing the resulting signatures).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}
