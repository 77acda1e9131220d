//! Identity document formats.
//!
//! ```text
//! SelfCertification raw:     UID:<uid>
//!                            META:TS:<timestamp>
//! Certification raw:         <selfcert signed-raw>META:TS:<number>-<hash>
//! Revocation raw:            <selfcert signed-raw>META:REVOKE
//!
//! SelfCertification inline:  pubkey:signature:timestamp:uid
//! Certification inline:      pubkey_from:pubkey_to:blocknumber:signature
//! ```

use crate::codec::primitives::{inline_token, split_inline};
use crate::codec::{LineReader, ParseOptions};
use crate::error::{InvariantViolation, ParseError};
use crate::grammar::parse_uint;
use crate::model::document::{require_signature, DependentDocument, Document};
use crate::model::{
    BlockId, Certification, Currency, HexHash, PublicKey, Revocation, SelfCertification,
    Signature,
};

const SELFCERT_INLINE: &str = "self-certification inline";
const CERT_INLINE: &str = "certification inline";

pub(crate) fn selfcert_raw(cert: &SelfCertification) -> String {
    format!("UID:{}\nMETA:TS:{}\n", cert.uid(), cert.timestamp())
}

pub(crate) fn certification_raw(cert: &Certification, selfcert: &SelfCertification) -> String {
    let mut raw = selfcert.signed_raw();
    raw.push_str(&format!("META:TS:{}\n", cert.block()));
    raw
}

pub(crate) fn revocation_raw(selfcert: &SelfCertification) -> String {
    let mut raw = selfcert.signed_raw();
    raw.push_str("META:REVOKE\n");
    raw
}

/// Consumes the lines of `selfcert`'s signed-raw form.
fn expect_selfcert(reader: &mut LineReader<'_>, selfcert: &SelfCertification) -> Result<(), ParseError> {
    let signed = selfcert.signed_raw();
    for line in signed.lines() {
        reader.expect_line(line, "self-certification")?;
    }
    Ok(())
}

impl SelfCertification {
    /// Parses the signed-raw form. The public key is not part of the text and
    /// must be supplied by the caller.
    pub fn from_signed_raw(
        version: u32,
        currency: Currency,
        pubkey: PublicKey,
        text: &str,
    ) -> Result<Self, ParseError> {
        Self::from_signed_raw_with_options(version, currency, pubkey, text, &ParseOptions::default())
    }

    /// Parses the signed-raw form with the given options.
    pub fn from_signed_raw_with_options(
        version: u32,
        currency: Currency,
        pubkey: PublicKey,
        text: &str,
        options: &ParseOptions,
    ) -> Result<Self, ParseError> {
        let mut reader = LineReader::new(text, options)?;
        let uid = reader.prefixed("UID:")?;
        let timestamp = reader.prefixed("META:TS:")?;
        let timestamp = reader.token(parse_uint(timestamp, "timestamp"))?;
        let signature = reader.single_signature()?;

        SelfCertification::new(version, currency, pubkey, timestamp, uid)
            .and_then(|cert| cert.with_signatures(vec![signature]))
            .map_err(|e| ParseError::new(e, 1))
    }

    /// Parses `pubkey:signature:timestamp:uid`. The uid may contain `:`.
    pub fn from_inline(version: u32, currency: Currency, inline: &str) -> Result<Self, ParseError> {
        let fields = split_inline(inline, 4, SELFCERT_INLINE)?;
        let pubkey = inline_token(SELFCERT_INLINE, PublicKey::new(fields[0]))?;
        let signature = inline_token(SELFCERT_INLINE, Signature::new(fields[1]))?;
        let timestamp = inline_token(SELFCERT_INLINE, parse_uint(fields[2], "timestamp"))?;

        SelfCertification::new(version, currency, pubkey, timestamp, fields[3])
            .and_then(|cert| cert.with_signatures(vec![signature]))
            .map_err(|e| ParseError::new(e, 1))
    }

    /// Returns `pubkey:signature:timestamp:uid`.
    pub fn inline(&self) -> Result<String, InvariantViolation> {
        let signature = require_signature(Self::DOC_TYPE, self.signatures())?;
        Ok(format!(
            "{}:{}:{}:{}",
            self.pubkey(),
            signature,
            self.timestamp(),
            self.uid()
        ))
    }
}

impl Certification {
    /// Parses the signed-raw form of a certification of `selfcert` issued by
    /// `pubkey_from`. The text must start with `selfcert`'s signed-raw form.
    pub fn from_signed_raw(
        version: u32,
        currency: Currency,
        pubkey_from: PublicKey,
        selfcert: &SelfCertification,
        text: &str,
    ) -> Result<Self, ParseError> {
        Self::from_signed_raw_with_options(
            version,
            currency,
            pubkey_from,
            selfcert,
            text,
            &ParseOptions::default(),
        )
    }

    /// Parses the signed-raw form with the given options.
    pub fn from_signed_raw_with_options(
        version: u32,
        currency: Currency,
        pubkey_from: PublicKey,
        selfcert: &SelfCertification,
        text: &str,
        options: &ParseOptions,
    ) -> Result<Self, ParseError> {
        let mut reader = LineReader::new(text, options)?;
        expect_selfcert(&mut reader, selfcert)?;
        let block = reader.prefixed("META:TS:")?;
        let block: BlockId = reader.token(block.parse())?;
        let signature = reader.single_signature()?;

        Certification::new(
            version,
            currency,
            pubkey_from,
            selfcert.pubkey().clone(),
            block.number,
            block.hash,
        )
        .with_signatures(vec![signature])
        .map_err(|e| ParseError::new(e, 1))
    }

    /// Parses `pubkey_from:pubkey_to:blocknumber:signature`.
    ///
    /// The inline form carries no block hash: `blockhash` supplies it, and is
    /// replaced by the empty hash when the block number is 0.
    pub fn from_inline(
        version: u32,
        currency: Currency,
        blockhash: HexHash,
        inline: &str,
    ) -> Result<Self, ParseError> {
        let fields = split_inline(inline, 4, CERT_INLINE)?;
        let pubkey_from = inline_token(CERT_INLINE, PublicKey::new(fields[0]))?;
        let pubkey_to = inline_token(CERT_INLINE, PublicKey::new(fields[1]))?;
        let blocknumber = inline_token(CERT_INLINE, parse_uint(fields[2], "block number"))?;
        let signature = inline_token(CERT_INLINE, Signature::new(fields[3]))?;

        Certification::new(version, currency, pubkey_from, pubkey_to, blocknumber, blockhash)
            .with_signatures(vec![signature])
            .map_err(|e| ParseError::new(e, 1))
    }

    /// Returns `pubkey_from:pubkey_to:blocknumber:signature`.
    pub fn inline(&self) -> Result<String, InvariantViolation> {
        let signature = require_signature(Self::DOC_TYPE, self.envelope().signatures())?;
        Ok(format!(
            "{}:{}:{}:{}",
            self.pubkey_from(),
            self.pubkey_to(),
            self.blocknumber(),
            signature
        ))
    }
}

impl Revocation {
    /// Parses the signed-raw form of a revocation of `selfcert`.
    pub fn from_signed_raw(
        version: u32,
        currency: Currency,
        selfcert: &SelfCertification,
        text: &str,
    ) -> Result<Self, ParseError> {
        Self::from_signed_raw_with_options(version, currency, selfcert, text, &ParseOptions::default())
    }

    /// Parses the signed-raw form with the given options.
    pub fn from_signed_raw_with_options(
        version: u32,
        currency: Currency,
        selfcert: &SelfCertification,
        text: &str,
        options: &ParseOptions,
    ) -> Result<Self, ParseError> {
        let mut reader = LineReader::new(text, options)?;
        expect_selfcert(&mut reader, selfcert)?;
        reader.expect_line("META:REVOKE", "META:REVOKE")?;
        let signature = reader.single_signature()?;

        Revocation::new(version, currency)
            .with_signatures(vec![signature])
            .map_err(|e| ParseError::new(e, 1))
    }
}
