//! Peer document and endpoint formats.
//!
//! ```text
//! Version: VERSION
//! Type: Peer
//! Currency: CURRENCY_NAME
//! PublicKey: NODE_PUBLICKEY
//! Block: NUMBER-HASH
//! Endpoints:
//! API_TAG FIELD...
//! ...
//! SIGNATURE
//! ```
//!
//! An endpoint line is always a tag followed by at least one space-separated
//! field, so it never matches the signature grammar.

use std::fmt;

use crate::codec::header::{read_header, write_header};
use crate::codec::{DocWriter, LineReader, ParseOptions};
use crate::error::{GrammarError, ParseError, ParseErrorKind};
use crate::grammar::endpoint::{is_ipv4, is_ipv6, is_server, parse_port};
use crate::grammar::is_signature;
use crate::limits::MAX_ENDPOINTS;
use crate::model::document::Document;
use crate::model::{BlockId, Endpoint, KnownApi, KnownEndpoint, Peer, PublicKey, UnknownEndpoint};

pub(crate) fn peer_raw(peer: &Peer) -> String {
    let mut writer = DocWriter::with_capacity(256);
    write_header(&mut writer, peer.version(), Peer::DOC_TYPE, peer.currency());
    writer.field("PublicKey", peer.pubkey());
    writer.field("Block", peer.block());
    writer.line("Endpoints:");
    writer.lines(peer.endpoints());
    writer.into_string()
}

impl Peer {
    /// Parses the signed-raw form.
    pub fn from_signed_raw(text: &str) -> Result<Self, ParseError> {
        Self::from_signed_raw_with_options(text, &ParseOptions::default())
    }

    /// Parses the signed-raw form with the given options.
    pub fn from_signed_raw_with_options(text: &str, options: &ParseOptions) -> Result<Self, ParseError> {
        let mut reader = LineReader::new(text, options)?;
        let (version, currency) = read_header(&mut reader, Self::DOC_TYPE, options)?;

        let pubkey = reader.field("PublicKey")?;
        let pubkey = reader.token(PublicKey::new(pubkey))?;
        let block = reader.field("Block")?;
        let block: BlockId = reader.token(block.parse())?;
        reader.expect_line("Endpoints:", "Endpoints:")?;

        let mut endpoints = Vec::new();
        loop {
            let Some(line) = reader.peek() else {
                return Err(ParseError::new(
                    ParseErrorKind::Truncated {
                        expected: "signature",
                    },
                    reader.position(),
                ));
            };
            if is_signature(line) {
                break;
            }
            reader.next_line("endpoint")?;
            if endpoints.len() == MAX_ENDPOINTS {
                return Err(reader.error(ParseErrorKind::SectionTooLarge {
                    section: "Endpoints",
                    max: MAX_ENDPOINTS,
                }));
            }
            let endpoint = Endpoint::from_inline(line).map_err(|e| reader.relocate(e))?;
            endpoints.push(endpoint);
        }
        let signature = reader.single_signature()?;

        tracing::trace!(pubkey = %pubkey, endpoints = endpoints.len(), "peer parsed");
        Peer::new(version, currency, pubkey, block, endpoints)
            .and_then(|peer| peer.with_signatures(vec![signature]))
            .map_err(|e| reader.error(e))
    }
}

// =============================================================================
// ENDPOINTS
// =============================================================================

/// Field slots of a known endpoint, in the order they must appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    Server,
    Ipv4,
    Ipv6,
    Port,
}

impl Slot {
    /// Detects which slot a token fills. Shapes are disjoint.
    fn of(token: &str) -> Option<Slot> {
        if is_server(token) {
            Some(Slot::Server)
        } else if is_ipv4(token) {
            Some(Slot::Ipv4)
        } else if is_ipv6(token) {
            Some(Slot::Ipv6)
        } else if parse_port(token).is_some() {
            Some(Slot::Port)
        } else {
            None
        }
    }
}

fn endpoint_error(token: &str, reason: &'static str) -> ParseError {
    ParseError::new(
        GrammarError::Endpoint {
            token: token.to_string(),
            reason,
        },
        1,
    )
}

impl KnownEndpoint {
    /// Parses the fields following a known API tag.
    ///
    /// Fields are optional but must appear in the order server, IPv4, IPv6,
    /// port; each token's slot is detected from its shape.
    fn from_fields<'a>(api: KnownApi, fields: impl Iterator<Item = &'a str>) -> Result<Self, ParseError> {
        let mut server = None;
        let mut ipv4 = None;
        let mut ipv6 = None;
        let mut port = None;
        let mut last: Option<Slot> = None;

        for token in fields {
            let slot = Slot::of(token).ok_or_else(|| endpoint_error(token, "unrecognized field"))?;
            if last.is_some_and(|last| slot <= last) {
                return Err(endpoint_error(token, "field out of order or repeated"));
            }
            last = Some(slot);
            match slot {
                Slot::Server => server = Some(token.to_string()),
                Slot::Ipv4 => ipv4 = Some(token.to_string()),
                Slot::Ipv6 => ipv6 = Some(token.to_string()),
                Slot::Port => port = parse_port(token),
            }
        }

        KnownEndpoint::new(api, server, ipv4, ipv6, port).map_err(|e| ParseError::new(e, 1))
    }
}

impl Endpoint {
    /// Parses an endpoint line: an API tag followed by space-separated fields.
    ///
    /// Known tags get their fields interpreted; any other tag is kept as an
    /// opaque list of words. Separators are exactly one space for every tag:
    /// tabs or repeated spaces are rejected, since the line could not be
    /// written back byte for byte.
    pub fn from_inline(inline: &str) -> Result<Self, ParseError> {
        let inline = inline.strip_suffix('\n').unwrap_or(inline);
        let Some((tag, rest)) = inline.split_once(' ') else {
            return Err(endpoint_error(inline, "endpoint has no fields"));
        };
        let fields = rest.split(' ');

        match KnownApi::from_tag(tag) {
            Some(api) => KnownEndpoint::from_fields(api, fields).map(Endpoint::Known),
            None => {
                let properties = fields.map(str::to_string).collect();
                UnknownEndpoint::new(tag, properties)
                    .map(Endpoint::Unknown)
                    .map_err(|e| ParseError::new(e, 1))
            }
        }
    }

    /// Returns the endpoint line.
    pub fn inline(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KnownEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api().tag())?;
        for field in [self.server(), self.ipv4(), self.ipv6()].into_iter().flatten() {
            write!(f, " {field}")?;
        }
        if let Some(port) = self.port() {
            write!(f, " {port}")?;
        }
        Ok(())
    }
}

impl fmt::Display for UnknownEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api())?;
        for property in self.properties() {
            write!(f, " {property}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Known(endpoint) => write!(f, "{endpoint}"),
            Endpoint::Unknown(endpoint) => write!(f, "{endpoint}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvariantViolation;
    use crate::model::{Currency, Signature};
    use crate::signer::Ed25519Signer;

    const SIGNED_RAW: &str = "Version: 1
Type: Peer
Currency: beta_brousouf
PublicKey: HsLShAtzXTVxeUtQd7yi5Z5Zh4zNvbu8sTEZ53nfKcqY
Block: 8-1922C324ABC4AF7EF7656734A31F5197888DDD52
Endpoints:
BASIC_MERKLED_API ucoin.twiced.fr 88.174.120.187 2001:db8::ff00:42:8329 9101
BASIC_MERKLED_API 88.174.120.187 33036
SOME_FUTURE_API a b c
dDuFkOXKZrHo1MzCrnsWLyKQa4YgNqgBEBTGbk52OzT/KKsGvcn2TSqgqiHzy2DHvgtwcZRS8wm+EEuW/L0IBw==
";

    #[test]
    fn test_signed_raw_round_trip() {
        let peer = Peer::from_signed_raw(SIGNED_RAW).unwrap();
        assert_eq!(peer.endpoints().len(), 3);
        assert_eq!(peer.block().number, 8);

        let Endpoint::Known(first) = &peer.endpoints()[0] else {
            panic!("expected a known endpoint");
        };
        assert_eq!(first.server(), Some("ucoin.twiced.fr"));
        assert_eq!(first.ipv6(), Some("2001:db8::ff00:42:8329"));
        assert_eq!(first.port(), Some(9101));

        let Endpoint::Known(second) = &peer.endpoints()[1] else {
            panic!("expected a known endpoint");
        };
        assert_eq!(second.server(), None);
        assert_eq!(second.ipv4(), Some("88.174.120.187"));

        assert_eq!(peer.signed_raw(), SIGNED_RAW);
    }

    #[test]
    fn test_unknown_endpoint_round_trips() {
        let endpoint = Endpoint::from_inline("SOME_FUTURE_API a b c").unwrap();
        let Endpoint::Unknown(unknown) = &endpoint else {
            panic!("expected an unknown endpoint");
        };
        assert_eq!(unknown.api(), "SOME_FUTURE_API");
        assert_eq!(unknown.properties(), ["a", "b", "c"]);
        assert_eq!(endpoint.inline(), "SOME_FUTURE_API a b c");
    }

    #[test]
    fn test_known_endpoint_field_errors() {
        let swapped = Endpoint::from_inline("BASIC_MERKLED_API 9101 ucoin.twiced.fr");
        assert!(matches!(
            swapped.unwrap_err().kind,
            ParseErrorKind::Grammar(GrammarError::Endpoint { .. })
        ));

        let garbage = Endpoint::from_inline("BASIC_MERKLED_API ???");
        assert!(garbage.is_err());

        let bare = Endpoint::from_inline("BASIC_MERKLED_API");
        assert!(bare.is_err());

        let double_space = Endpoint::from_inline("BASIC_MERKLED_API  80");
        assert!(double_space.is_err());
    }

    #[test]
    fn test_unknown_endpoint_needs_single_spaces() {
        for inline in ["SOME_FUTURE_API a  b", "SOME_FUTURE_API a\tb", "SOME_FUTURE_API a "] {
            let err = Endpoint::from_inline(inline).unwrap_err();
            assert!(
                matches!(err.kind, ParseErrorKind::Grammar(GrammarError::Endpoint { .. })),
                "{inline:?} gave {err}"
            );
        }
    }

    #[test]
    fn test_tag_match_is_exact() {
        let endpoint = Endpoint::from_inline("BASIC_MERKLED_API_V2 host 80").unwrap();
        assert!(matches!(endpoint, Endpoint::Unknown(_)));
    }

    #[test]
    fn test_missing_signature_is_truncated() {
        let text = SIGNED_RAW
            .lines()
            .take(9)
            .map(|line| format!("{line}\n"))
            .collect::<String>();
        let err = Peer::from_signed_raw(&text).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Truncated { expected: "signature" });
        assert_eq!(err.position, 10);
    }

    #[test]
    fn test_bad_endpoint_reports_its_line() {
        let text = SIGNED_RAW.replace("BASIC_MERKLED_API 88.174.120.187 33036", "BASIC_MERKLED_API 33036 88.174.120.187");
        let err = Peer::from_signed_raw(&text).unwrap_err();
        assert_eq!(err.position, 8);
    }

    #[test]
    fn test_endpoint_limit_matches_parser() {
        let key = Ed25519Signer::from_seed([8u8; 32]);
        let endpoint = Endpoint::from_inline("BASIC_MERKLED_API ucoin.twiced.fr 9101").unwrap();
        let build = |count: usize| {
            Peer::new(
                1,
                Currency::new("beta_brousouf").unwrap(),
                PublicKey::new("HsLShAtzXTVxeUtQd7yi5Z5Zh4zNvbu8sTEZ53nfKcqY").unwrap(),
                "8-1922C324ABC4AF7EF7656734A31F5197888DDD52".parse().unwrap(),
                vec![endpoint.clone(); count],
            )
        };

        let full = build(MAX_ENDPOINTS).unwrap().signed(&[&key]).unwrap();
        let parsed = Peer::from_signed_raw(&full.signed_raw()).unwrap();
        assert_eq!(parsed, full);

        assert_eq!(
            build(MAX_ENDPOINTS + 1).unwrap_err(),
            InvariantViolation::SectionTooLarge {
                section: "Endpoints",
                actual: MAX_ENDPOINTS + 1,
                max: MAX_ENDPOINTS,
            }
        );
    }

    #[test]
    fn test_sign_and_parse() {
        let key = Ed25519Signer::from_seed([8u8; 32]);
        let endpoint = Endpoint::from_inline("BASIC_MERKLED_API ucoin.twiced.fr 9101").unwrap();
        let peer = Peer::new(
            1,
            Currency::new("beta_brousouf").unwrap(),
            PublicKey::new("HsLShAtzXTVxeUtQd7yi5Z5Zh4zNvbu8sTEZ53nfKcqY").unwrap(),
            "8-1922C324ABC4AF7EF7656734A31F5197888DDD52".parse().unwrap(),
            vec![endpoint],
        )
        .unwrap()
        .signed(&[&key])
        .unwrap();

        let parsed = Peer::from_signed_raw(&peer.signed_raw()).unwrap();
        assert_eq!(parsed, peer);
        let signature: &Signature = parsed.signature().unwrap();
        assert!(key.verify(parsed.raw().as_bytes(), signature));
    }
}
