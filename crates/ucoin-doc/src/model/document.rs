//! The envelope shared by every document and the document traits.

use serde::Serialize;

use crate::error::InvariantViolation;
use crate::model::{Currency, SelfCertification, Signature};

/// Fields common to every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub version: u32,
    pub currency: Currency,
    pub(crate) signatures: Vec<Signature>,
}

impl Envelope {
    /// Creates an unsigned envelope.
    pub fn new(version: u32, currency: Currency) -> Self {
        Self {
            version,
            currency,
            signatures: Vec::new(),
        }
    }

    /// Signatures in issuer order.
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }
}

/// A document whose raw form depends only on its own fields.
pub trait Document {
    /// Document type name, as written on the `Type:` line where applicable.
    const DOC_TYPE: &'static str;

    /// Returns the shared envelope.
    fn envelope(&self) -> &Envelope;

    /// Returns the exact payload that gets signed.
    fn raw(&self) -> String;

    /// Returns the raw payload followed by one signature per line.
    fn signed_raw(&self) -> String {
        signed_raw(self.raw(), self.signatures())
    }

    fn version(&self) -> u32 {
        self.envelope().version
    }

    fn currency(&self) -> &Currency {
        &self.envelope().currency
    }

    fn signatures(&self) -> &[Signature] {
        self.envelope().signatures()
    }
}

/// A document whose raw form embeds a self-certification's signed form.
///
/// The self-certification is borrowed for the duration of the call: the
/// document never stores or looks it up.
pub trait DependentDocument {
    /// Document type name.
    const DOC_TYPE: &'static str;

    /// Returns the shared envelope.
    fn envelope(&self) -> &Envelope;

    /// Returns the exact payload that gets signed.
    fn raw(&self, selfcert: &SelfCertification) -> String;

    /// Returns the raw payload followed by one signature per line.
    fn signed_raw(&self, selfcert: &SelfCertification) -> String {
        signed_raw(self.raw(selfcert), self.envelope().signatures())
    }
}

/// Appends signature lines to a raw payload.
pub(crate) fn signed_raw(mut raw: String, signatures: &[Signature]) -> String {
    for signature in signatures {
        raw.push_str(signature.as_str());
        raw.push('\n');
    }
    raw
}

/// Checks a list length against the limit its parser enforces.
pub(crate) fn check_section_len(
    section: &'static str,
    actual: usize,
    max: usize,
) -> Result<(), InvariantViolation> {
    if actual > max {
        return Err(InvariantViolation::SectionTooLarge {
            section,
            actual,
            max,
        });
    }
    Ok(())
}

/// Checks the signature list of a document that has a single issuer.
pub(crate) fn check_single_signature(
    document: &'static str,
    signatures: &[Signature],
) -> Result<(), InvariantViolation> {
    if signatures.len() > 1 {
        return Err(InvariantViolation::TooManySignatures {
            document,
            actual: signatures.len(),
        });
    }
    Ok(())
}

/// Returns the single signature, or an error naming the unsigned document.
pub(crate) fn require_signature<'a>(
    document: &'static str,
    signatures: &'a [Signature],
) -> Result<&'a Signature, InvariantViolation> {
    signatures
        .first()
        .ok_or(InvariantViolation::MissingSignature { document })
}
