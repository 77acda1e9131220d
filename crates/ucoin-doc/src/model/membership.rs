//! Membership documents: joining or leaving the web of trust.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, GrammarError, InvariantViolation};
use crate::grammar::validate_uid;
use crate::model::document::{check_single_signature, Document, Envelope};
use crate::model::{BlockId, Currency, PublicKey, Signature};
use crate::signer::{sign_raw, Signer};

/// Direction of a membership request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipType {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

impl MembershipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipType::In => "IN",
            MembershipType::Out => "OUT",
        }
    }
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipType {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(MembershipType::In),
            "OUT" => Ok(MembershipType::Out),
            _ => Err(GrammarError::MembershipType {
                token: s.to_string(),
            }),
        }
    }
}

/// A request by `issuer` to enter or leave the community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Membership {
    #[serde(flatten)]
    envelope: Envelope,
    issuer: PublicKey,
    block: BlockId,
    membership_type: MembershipType,
    uid: String,
    cert_ts: u64,
}

impl Membership {
    /// Creates an unsigned membership.
    pub fn new(
        version: u32,
        currency: Currency,
        issuer: PublicKey,
        block: BlockId,
        membership_type: MembershipType,
        uid: impl Into<String>,
        cert_ts: u64,
    ) -> Result<Self, InvariantViolation> {
        let uid = uid.into();
        validate_uid(&uid)?;
        Ok(Self {
            envelope: Envelope::new(version, currency),
            issuer,
            block,
            membership_type,
            uid,
            cert_ts,
        })
    }

    pub fn issuer(&self) -> &PublicKey {
        &self.issuer
    }

    /// The reference block.
    pub fn block(&self) -> &BlockId {
        &self.block
    }

    pub fn membership_type(&self) -> MembershipType {
        self.membership_type
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Timestamp of the identity's self-certification.
    pub fn cert_ts(&self) -> u64 {
        self.cert_ts
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

impl Document for Membership {
    const DOC_TYPE: &'static str = "Membership";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn raw(&self) -> String {
        crate::codec::membership::membership_raw(self)
    }
}
