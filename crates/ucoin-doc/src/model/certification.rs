//! Identity documents: self-certification, certification and revocation.

use serde::Serialize;

use crate::error::{Error, InvariantViolation};
use crate::grammar::validate_uid;
use crate::model::document::{check_single_signature, DependentDocument, Document, Envelope};
use crate::model::{BlockId, Currency, HexHash, PublicKey, Signature};
use crate::signer::{sign_raw, Signer};

/// An identity binding a uid to a public key at a given time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfCertification {
    #[serde(flatten)]
    envelope: Envelope,
    pubkey: PublicKey,
    timestamp: u64,
    uid: String,
}

impl SelfCertification {
    /// Creates an unsigned self-certification.
    pub fn new(
        version: u32,
        currency: Currency,
        pubkey: PublicKey,
        timestamp: u64,
        uid: impl Into<String>,
    ) -> Result<Self, InvariantViolation> {
        let uid = uid.into();
        validate_uid(&uid)?;
        Ok(Self {
            envelope: Envelope::new(version, currency),
            pubkey,
            timestamp,
            uid,
        })
    }

    pub fn pubkey(&self) -> &PublicKey {
        &self.pubkey
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// The identity owner's signature, if signed.
    pub fn signature(&self) -> Option<&Signature> {
        self.envelope.signatures.first()
    }

    /// Returns a copy carrying the given signatures (at most one).
    pub fn with_signatures(mut self, signatures: Vec<Signature>) -> Result<Self, InvariantViolation> {
        check_single_signature(Self::DOC_TYPE, &signatures)?;
        self.envelope.signatures = signatures;
        Ok(self)
    }

    /// Signs the raw form, replacing any existing signature.
    pub fn sign(&mut self, keys: &[&dyn Signer]) -> Result<(), Error> {
        let signatures = sign_raw(&self.raw(), keys)?;
        check_single_signature(Self::DOC_TYPE, &signatures)?;
        self.envelope.signatures = signatures;
        Ok(())
    }

    /// Consumes the document and returns it signed.
    pub fn signed(mut self, keys: &[&dyn Signer]) -> Result<Self, Error> {
        self.sign(keys)?;
        Ok(self)
    }
}

/// A certification of someone else's identity.
///
/// When the anchoring block is block 0 the block hash is always
/// [`EMPTY_HASH`](crate::limits::EMPTY_HASH), whatever hash was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Certification {
    #[serde(flatten)]
    envelope: Envelope,
    pubkey_from: PublicKey,
    pubkey_to: PublicKey,
    block: BlockId,
}

impl Certification {
    /// Creates an unsigned certification from `pubkey_from` to `pubkey_to`.
    pub fn new(
        version: u32,
        currency: Currency,
        pubkey_from: PublicKey,
        pubkey_to: PublicKey,
        blocknumber: u64,
        blockhash: HexHash,
    ) -> Self {
        let blockhash = if blocknumber == 0 {
            HexHash::empty()
        } else {
            blockhash
        };
        Self {
            envelope: Envelope::new(version, currency),
            pubkey_from,
            pubkey_to,
            block: BlockId::new(blocknumber, blockhash),
        }
    }

    pub fn pubkey_from(&self) -> &PublicKey {
        &self.pubkey_from
    }

    pub fn pubkey_to(&self) -> &PublicKey {
        &self.pubkey_to
    }

    pub fn block(&self) -> &BlockId {
        &self.block
    }

    pub fn blocknumber(&self) -> u64 {
        self.block.number
    }

    pub fn blockhash(&self) -> &HexHash {
        &self.block.hash
    }

    /// The certifier's signature, if signed.
    pub fn signature(&self) -> Option<&Signature> {
        self.envelope.signatures.first()
    }

    /// Returns a copy carrying the given signatures (at most one).
    pub fn with_signatures(mut self, signatures: Vec<Signature>) -> Result<Self, InvariantViolation> {
        check_single_signature(Self::DOC_TYPE, &signatures)?;
        self.envelope.signatures = signatures;
        Ok(self)
    }

    /// Signs the raw form built on `selfcert`, replacing any existing signature.
    pub fn sign(&mut self, selfcert: &SelfCertification, keys: &[&dyn Signer]) -> Result<(), Error> {
        let signatures = sign_raw(&self.raw(selfcert), keys)?;
        check_single_signature(Self::DOC_TYPE, &signatures)?;
        self.envelope.signatures = signatures;
        Ok(())
    }
}

/// Revokes a self-certification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Revocation {
    #[serde(flatten)]
    envelope: Envelope,
}

impl Revocation {
    /// Creates an unsigned revocation.
    pub fn new(version: u32, currency: Currency) -> Self {
        Self {
            envelope: Envelope::new(version, currency),
        }
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.envelope.signatures.first()
    }

    /// Returns a copy carrying the given signatures (at most one).
    pub fn with_signatures(mut self, signatures: Vec<Signature>) -> Result<Self, InvariantViolation> {
        check_single_signature(Self::DOC_TYPE, &signatures)?;
        self.envelope.signatures = signatures;
        Ok(self)
    }

    /// Signs the raw form built on `selfcert`, replacing any existing signature.
    pub fn sign(&mut self, selfcert: &SelfCertification, keys: &[&dyn Signer]) -> Result<(), Error> {
        let signatures = sign_raw(&self.raw(selfcert), keys)?;
        check_single_signature(Self::DOC_TYPE, &signatures)?;
        self.envelope.signatures = signatures;
        Ok(())
    }
}

impl Document for SelfCertification {
    const DOC_TYPE: &'static str = "SelfCertification";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn raw(&self) -> String {
        crate::codec::certification::selfcert_raw(self)
    }
}

impl DependentDocument for Certification {
    const DOC_TYPE: &'static str = "Certification";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn raw(&self, selfcert: &SelfCertification) -> String {
        crate::codec::certification::certification_raw(self, selfcert)
    }
}

impl DependentDocument for Revocation {
    const DOC_TYPE: &'static str = "Revocation";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn raw(&self, selfcert: &SelfCertification) -> String {
        crate::codec::certification::revocation_raw(selfcert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::EMPTY_HASH;
    use crate::signer::Ed25519Signer;

    fn currency() -> Currency {
        Currency::new("beta_brousouf").unwrap()
    }

    fn selfcert() -> SelfCertification {
        SelfCertification::new(
            1,
            currency(),
            PublicKey::new("HsLShAtzXTVxeUtQd7yi5Z5Zh4zNvbu8sTEZ53nfKcqY").unwrap(),
            1409990782,
            "cat",
        )
        .unwrap()
    }

    #[test]
    fn test_block_zero_forces_empty_hash() {
        let cert = Certification::new(
            1,
            currency(),
            PublicKey::new("8Fi1VSTbjkXguwThF4v2ZxC5whK7pwG2vcGTkPUPjPGU").unwrap(),
            PublicKey::new("HsLShAtzXTVxeUtQd7yi5Z5Zh4zNvbu8sTEZ53nfKcqY").unwrap(),
            0,
            HexHash::new("ABCDEF0123").unwrap(),
        );
        assert_eq!(cert.blockhash().as_str(), EMPTY_HASH);
    }

    #[test]
    fn test_uid_must_be_single_line() {
        let result = SelfCertification::new(
            1,
            currency(),
            PublicKey::new("HsLShAtzXTVxeUtQd7yi5Z5Zh4zNvbu8sTEZ53nfKcqY").unwrap(),
            1,
            "two\nlines",
        );
        assert!(matches!(result, Err(InvariantViolation::Grammar(_))));
    }

    #[test]
    fn test_sign_replaces_signatures() {
        let first = Ed25519Signer::from_seed([1u8; 32]);
        let second = Ed25519Signer::from_seed([2u8; 32]);

        let mut cert = selfcert();
        cert.sign(&[&first]).unwrap();
        let before = cert.signature().cloned();
        cert.sign(&[&second]).unwrap();

        assert_eq!(cert.signatures().len(), 1);
        assert_ne!(cert.signature().cloned(), before);
    }

    #[test]
    fn test_sign_rejects_two_keys() {
        let a = Ed25519Signer::from_seed([1u8; 32]);
        let b = Ed25519Signer::from_seed([2u8; 32]);

        let mut cert = selfcert();
        let result = cert.sign(&[&a, &b]);
        assert!(matches!(
            result,
            Err(Error::Invariant(InvariantViolation::TooManySignatures { actual: 2, .. }))
        ));
        assert!(cert.signature().is_none());
    }

    #[test]
    fn test_revocation_signature_covers_selfcert() {
        let key = Ed25519Signer::from_seed([3u8; 32]);
        let selfcert = selfcert().signed(&[&key]).unwrap();

        let mut revocation = Revocation::new(1, currency());
        revocation.sign(&selfcert, &[&key]).unwrap();

        let raw = revocation.raw(&selfcert);
        let sig = revocation.signature().unwrap();
        assert!(key.verify(raw.as_bytes(), sig));
    }
}
