//! Signing capability consumed by documents.
//!
//! The codec never holds private keys itself: documents hand their raw text to
//! a [`Signer`] and store the base64 encoding of whatever bytes come back.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{SignerError, SigningError};
use crate::model::Signature;

/// Produces a signature over a document's raw bytes.
pub trait Signer {
    /// Signs `message` and returns the raw signature bytes.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError>;
}

/// Ed25519 signer backed by `ed25519-dalek`.
pub struct Ed25519Signer(ed25519_dalek::SigningKey);

impl Ed25519Signer {
    /// Creates a signer from a 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&seed))
    }

    /// Returns the 32-byte public key.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.0.verifying_key().to_bytes()
    }

    /// Verifies a base64 document signature against this signer's public key.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        use ed25519_dalek::Verifier;

        let Ok(bytes) = STANDARD.decode(signature.as_str()) else {
            return false;
        };
        let Ok(bytes) = <[u8; 64]>::try_from(bytes.as_slice()) else {
            return false;
        };
        let sig = ed25519_dalek::Signature::from_bytes(&bytes);
        self.0.verifying_key().verify(message, &sig).is_ok()
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        use ed25519_dalek::Signer as _;
        Ok(self.0.sign(message).to_bytes().to_vec())
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signer(<redacted>)")
    }
}

/// Signs `raw` with every key, in order, returning one signature per key.
///
/// The payload must be ASCII: documents are signed over their ASCII bytes.
pub fn sign_raw(raw: &str, keys: &[&dyn Signer]) -> Result<Vec<Signature>, SigningError> {
    if let Some(offset) = raw.bytes().position(|b| !b.is_ascii()) {
        return Err(SigningError::NonAsciiPayload { offset });
    }

    let mut signatures = Vec::with_capacity(keys.len());
    for key in keys {
        let bytes = key.sign(raw.as_bytes()).map_err(SigningError::Signer)?;
        let encoded = STANDARD.encode(bytes);
        tracing::debug!(signature = %encoded, "document signed");
        // Standard base64 output always satisfies the signature grammar.
        let signature = Signature::new(encoded)
            .map_err(|e| SigningError::Signer(Box::new(e)))?;
        signatures.push(signature);
    }
    Ok(signatures)
}
