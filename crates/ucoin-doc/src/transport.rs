//! Hand-off of finished documents to a network layer.
//!
//! The codec does not talk to nodes. A [`Transport`] receives a
//! [`Submission`]: the text to send and the kind of document it holds, so
//! the transport can pick the right endpoint.

use serde::Serialize;

use crate::error::InvariantViolation;
use crate::model::{
    Certification, DependentDocument, Document, Membership, Peer, Revocation, SelfCertification,
    Transaction,
};

/// Kind of document carried by a [`Submission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    Identity,
    Certification,
    Revocation,
    Membership,
    Peer,
    Transaction,
}

/// A signed document ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub kind: SubmissionKind,
    pub body: String,
}

impl Submission {
    /// Submits a self-certification by its signed-raw form.
    pub fn identity(selfcert: &SelfCertification) -> Result<Self, InvariantViolation> {
        require_signed(SelfCertification::DOC_TYPE, selfcert.signatures().len())?;
        Ok(Self {
            kind: SubmissionKind::Identity,
            body: selfcert.signed_raw(),
        })
    }

    /// Submits a certification of `selfcert`.
    pub fn certification(
        cert: &Certification,
        selfcert: &SelfCertification,
    ) -> Result<Self, InvariantViolation> {
        require_signed(Certification::DOC_TYPE, cert.envelope().signatures().len())?;
        Ok(Self {
            kind: SubmissionKind::Certification,
            body: cert.signed_raw(selfcert),
        })
    }

    /// Submits a revocation of `selfcert`.
    pub fn revocation(
        revocation: &Revocation,
        selfcert: &SelfCertification,
    ) -> Result<Self, InvariantViolation> {
        require_signed(Revocation::DOC_TYPE, revocation.envelope().signatures().len())?;
        Ok(Self {
            kind: SubmissionKind::Revocation,
            body: revocation.signed_raw(selfcert),
        })
    }

    pub fn membership(membership: &Membership) -> Result<Self, InvariantViolation> {
        require_signed(Membership::DOC_TYPE, membership.signatures().len())?;
        Ok(Self {
            kind: SubmissionKind::Membership,
            body: membership.signed_raw(),
        })
    }

    pub fn peer(peer: &Peer) -> Result<Self, InvariantViolation> {
        require_signed(Peer::DOC_TYPE, peer.signatures().len())?;
        Ok(Self {
            kind: SubmissionKind::Peer,
            body: peer.signed_raw(),
        })
    }

    /// Submits a transaction by its signed-raw form.
    pub fn transaction(tx: &Transaction) -> Result<Self, InvariantViolation> {
        require_signed(Transaction::DOC_TYPE, tx.signatures().len())?;
        Ok(Self {
            kind: SubmissionKind::Transaction,
            body: tx.signed_raw(),
        })
    }
}

fn require_signed(document: &'static str, signatures: usize) -> Result<(), InvariantViolation> {
    if signatures == 0 {
        return Err(InvariantViolation::MissingSignature { document });
    }
    Ok(())
}

/// Network layer accepting finished documents.
///
/// Retries, timeouts and reply validation belong to the implementation.
pub trait Transport {
    type Error: std::error::Error + Send + Sync + 'static;

    fn submit(&self, submission: &Submission) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::model::{BlockId, Currency, Endpoint, MembershipType, PublicKey};
    use crate::signer::Ed25519Signer;

    #[derive(Debug, thiserror::Error)]
    #[error("node rejected the document")]
    struct Rejected;

    #[derive(Default)]
    struct RecordingTransport {
        sent: RefCell<Vec<Submission>>,
        reject: bool,
    }

    impl Transport for RecordingTransport {
        type Error = Rejected;

        fn submit(&self, submission: &Submission) -> Result<(), Self::Error> {
            if self.reject {
                return Err(Rejected);
            }
            self.sent.borrow_mut().push(submission.clone());
            Ok(())
        }
    }

    fn currency() -> Currency {
        Currency::new("beta_brousouf").unwrap()
    }

    fn pubkey() -> PublicKey {
        PublicKey::new("HsLShAtzXTVxeUtQd7yi5Z5Zh4zNvbu8sTEZ53nfKcqY").unwrap()
    }

    fn block() -> BlockId {
        "8-1922C324ABC4AF7EF7656734A31F5197888DDD52".parse().unwrap()
    }

    #[test]
    fn test_unsigned_documents_are_refused() {
        let membership =
            Membership::new(1, currency(), pubkey(), block(), MembershipType::In, "cat", 1).unwrap();
        assert_eq!(
            Submission::membership(&membership).unwrap_err(),
            InvariantViolation::MissingSignature {
                document: "Membership"
            }
        );
    }

    #[test]
    fn test_submit_signed_documents() {
        let key = Ed25519Signer::from_seed([12u8; 32]);
        let transport = RecordingTransport::default();

        let selfcert = SelfCertification::new(1, currency(), pubkey(), 1409990782, "cat")
            .unwrap()
            .signed(&[&key])
            .unwrap();
        let endpoint = Endpoint::from_inline("BASIC_MERKLED_API ucoin.twiced.fr 9101").unwrap();
        let peer = Peer::new(1, currency(), pubkey(), block(), vec![endpoint])
            .unwrap()
            .signed(&[&key])
            .unwrap();
        let mut revocation = Revocation::new(1, currency());
        revocation.sign(&selfcert, &[&key]).unwrap();

        transport.submit(&Submission::identity(&selfcert).unwrap()).unwrap();
        transport.submit(&Submission::peer(&peer).unwrap()).unwrap();
        transport
            .submit(&Submission::revocation(&revocation, &selfcert).unwrap())
            .unwrap();

        let sent = transport.sent.borrow();
        let kinds: Vec<SubmissionKind> = sent.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [SubmissionKind::Identity, SubmissionKind::Peer, SubmissionKind::Revocation]
        );
        assert_eq!(sent[1].body, peer.signed_raw());
        assert!(sent[2].body.ends_with(&format!(
            "META:REVOKE\n{}\n",
            revocation.signature().unwrap()
        )));
    }

    #[test]
    fn test_transport_errors_propagate() {
        let key = Ed25519Signer::from_seed([13u8; 32]);
        let transport = RecordingTransport {
            reject: true,
            ..Default::default()
        };
        let selfcert = SelfCertification::new(1, currency(), pubkey(), 1, "cat")
            .unwrap()
            .signed(&[&key])
            .unwrap();
        let err = transport
            .submit(&Submission::identity(&selfcert).unwrap())
            .unwrap_err();
        assert_eq!(err.to_string(), "node rejected the document");
    }
}
