//! Membership document format.
//!
//! ```text
//! Version: VERSION
//! Type: Membership
//! Currency: CURRENCY_NAME
//! Issuer: ISSUER
//! Block: NUMBER-HASH
//! Membership: IN|OUT
//! UserID: USER_ID
//! CertTS: CERTIFICATION_TS
//! SIGNATURE
//! ```
//!
//! Inline: `issuer:signature:block_number:block_hash:cert_ts:uid`.

use crate::codec::header::{read_header, write_header};
use crate::codec::primitives::{inline_token, split_inline};
use crate::codec::{DocWriter, LineReader, ParseOptions};
use crate::error::{InvariantViolation, ParseError};
use crate::grammar::parse_uint;
use crate::model::document::{require_signature, Document};
use crate::model::{BlockId, Currency, HexHash, Membership, MembershipType, PublicKey, Signature};

const INLINE: &str = "membership inline";

pub(crate) fn membership_raw(membership: &Membership) -> String {
    let mut writer = DocWriter::with_capacity(256);
    write_header(
        &mut writer,
        membership.version(),
        Membership::DOC_TYPE,
        membership.currency(),
    );
    writer.field("Issuer", membership.issuer());
    writer.field("Block", membership.block());
    writer.field("Membership", membership.membership_type());
    writer.field("UserID", membership.uid());
    writer.field("CertTS", membership.cert_ts());
    writer.into_string()
}

impl Membership {
    /// Parses the signed-raw form.
    pub fn from_signed_raw(text: &str) -> Result<Self, ParseError> {
        Self::from_signed_raw_with_options(text, &ParseOptions::default())
    }

    /// Parses the signed-raw form with the given options.
    pub fn from_signed_raw_with_options(text: &str, options: &ParseOptions) -> Result<Self, ParseError> {
        let mut reader = LineReader::new(text, options)?;
        let (version, currency) = read_header(&mut reader, Self::DOC_TYPE, options)?;

        let issuer = reader.field("Issuer")?;
        let issuer = reader.token(PublicKey::new(issuer))?;
        let block = reader.field("Block")?;
        let block: BlockId = reader.token(block.parse())?;
        let membership_type = reader.field("Membership")?;
        let membership_type: MembershipType = reader.token(membership_type.parse())?;
        let uid = reader.field("UserID")?;
        let uid_line = reader.last_position();
        let cert_ts = reader.field("CertTS")?;
        let cert_ts = reader.token(parse_uint(cert_ts, "cert_ts"))?;
        let signature = reader.single_signature()?;

        let membership = Membership::new(version, currency, issuer, block, membership_type, uid, cert_ts)
            .map_err(|e| ParseError::new(e, uid_line))?;
        tracing::trace!(issuer = %membership.issuer(), "membership parsed");
        membership
            .with_signatures(vec![signature])
            .map_err(|e| reader.error(e))
    }

    /// Parses `issuer:signature:block_number:block_hash:cert_ts:uid`.
    ///
    /// The membership type is not part of the inline form; it is given by the
    /// list the line was found in.
    pub fn from_inline(
        version: u32,
        currency: Currency,
        membership_type: MembershipType,
        inline: &str,
    ) -> Result<Self, ParseError> {
        let fields = split_inline(inline, 6, INLINE)?;
        let issuer = inline_token(INLINE, PublicKey::new(fields[0]))?;
        let signature = inline_token(INLINE, Signature::new(fields[1]))?;
        let number = inline_token(INLINE, parse_uint(fields[2], "block number"))?;
        let hash = inline_token(INLINE, HexHash::new(fields[3]))?;
        let cert_ts = inline_token(INLINE, parse_uint(fields[4], "cert_ts"))?;

        Membership::new(
            version,
            currency,
            issuer,
            BlockId::new(number, hash),
            membership_type,
            fields[5],
            cert_ts,
        )
        .and_then(|m| m.with_signatures(vec![signature]))
        .map_err(|e| ParseError::new(e, 1))
    }

    /// Returns `issuer:signature:block_number:block_hash:cert_ts:uid`.
    pub fn inline(&self) -> Result<String, InvariantViolation> {
        let signature = require_signature(Self::DOC_TYPE, self.signatures())?;
        Ok(format!(
            "{}:{}:{}:{}:{}:{}",
            self.issuer(),
            signature,
            self.block().number,
            self.block().hash,
            self.cert_ts(),
            self.uid()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GrammarError, ParseErrorKind};
    use crate::signer::Ed25519Signer;

    const ISSUER: &str = "HsLShAtzXTVxeUtQd7yi5Z5Zh4zNvbu8sTEZ53nfKcqY";

    fn membership() -> Membership {
        Membership::new(
            1,
            Currency::new("beta_brousouf").unwrap(),
            PublicKey::new(ISSUER).unwrap(),
            "0-DA39A3EE5E6B4B0D3255BFEF95601890AFD80709".parse().unwrap(),
            MembershipType::In,
            "cat",
            1409990782,
        )
        .unwrap()
    }

    const SIGNED_RAW: &str = "Version: 1
Type: Membership
Currency: beta_brousouf
Issuer: HsLShAtzXTVxeUtQd7yi5Z5Zh4zNvbu8sTEZ53nfKcqY
Block: 0-DA39A3EE5E6B4B0D3255BFEF95601890AFD80709
Membership: IN
UserID: cat
CertTS: 1409990782
SIG
";

    #[test]
    fn test_raw_layout() {
        let signed = membership()
            .with_signatures(vec![Signature::new("SIG").unwrap()])
            .unwrap();
        assert_eq!(signed.signed_raw(), SIGNED_RAW);
        assert!(SIGNED_RAW.starts_with(&signed.raw()));
    }

    #[test]
    fn test_signed_raw_round_trip() {
        let parsed = Membership::from_signed_raw(SIGNED_RAW).unwrap();
        assert_eq!(parsed.uid(), "cat");
        assert_eq!(parsed.membership_type(), MembershipType::In);
        assert_eq!(parsed.signature().map(Signature::as_str), Some("SIG"));
        assert_eq!(parsed.signed_raw(), SIGNED_RAW);
    }

    #[test]
    fn test_signed_raw_errors() {
        let wrong_label = SIGNED_RAW.replace("UserID: cat", "User: cat");
        let err = Membership::from_signed_raw(&wrong_label).unwrap_err();
        assert_eq!(err.position, 7);
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedField { expected: "UserID", .. }));

        let bad_type = SIGNED_RAW.replace("Membership: IN", "Membership: MAYBE");
        let err = Membership::from_signed_raw(&bad_type).unwrap_err();
        assert_eq!(err.position, 6);
        assert!(matches!(
            err.kind,
            ParseErrorKind::Grammar(GrammarError::MembershipType { .. })
        ));

        let unsigned = SIGNED_RAW.trim_end_matches("SIG\n");
        let err = Membership::from_signed_raw(unsigned).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Truncated { expected: "signature" });
        assert_eq!(err.position, 9);
    }

    #[test]
    fn test_leading_zeros_are_rejected() {
        let padded_block = SIGNED_RAW.replace("Block: 0-", "Block: 007-");
        let err = Membership::from_signed_raw(&padded_block).unwrap_err();
        assert_eq!(err.position, 5);
        assert!(matches!(err.kind, ParseErrorKind::Grammar(GrammarError::BlockId { .. })));

        let padded_ts = SIGNED_RAW.replace("CertTS: 1409990782", "CertTS: 01409990782");
        let err = Membership::from_signed_raw(&padded_ts).unwrap_err();
        assert_eq!(err.position, 8);
        assert!(matches!(
            err.kind,
            ParseErrorKind::Grammar(GrammarError::Integer { field: "cert_ts", .. })
        ));

        let inline = "HsLShAtzXTVxeUtQd7yi5Z5Zh4zNvbu8sTEZ53nfKcqY:SIG:00:DA39A3EE5E6B4B0D3255BFEF95601890AFD80709:1409990782:cat";
        let err = Membership::from_inline(
            1,
            Currency::new("beta_brousouf").unwrap(),
            MembershipType::In,
            inline,
        )
        .unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Malformed { context: INLINE, .. }));
    }

    #[test]
    fn test_inline_round_trip() {
        let inline = "HsLShAtzXTVxeUtQd7yi5Z5Zh4zNvbu8sTEZ53nfKcqY:SIG:0:DA39A3EE5E6B4B0D3255BFEF95601890AFD80709:1409990782:cat";
        let parsed = Membership::from_inline(
            1,
            Currency::new("beta_brousouf").unwrap(),
            MembershipType::Out,
            inline,
        )
        .unwrap();
        assert_eq!(parsed.membership_type(), MembershipType::Out);
        assert_eq!(parsed.cert_ts(), 1409990782);
        assert_eq!(parsed.inline().unwrap(), inline);
    }

    #[test]
    fn test_sign_and_parse() {
        let key = Ed25519Signer::from_seed([7u8; 32]);
        let signed = membership().signed(&[&key]).unwrap();
        let parsed = Membership::from_signed_raw(&signed.signed_raw()).unwrap();
        assert_eq!(parsed, signed);
        assert!(key.verify(parsed.raw().as_bytes(), parsed.signature().unwrap()));
    }
}
