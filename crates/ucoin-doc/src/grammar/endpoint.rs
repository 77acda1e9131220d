//! Shape rules for endpoint fields.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::GrammarError;
use crate::grammar::is_canonical_uint;

/// Returns true for a DNS name: letters, digits, `-`, `_` and `.`, with at
/// least one letter so that bare numbers and dotted quads never match.
pub fn is_server(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        && token.bytes().any(|b| b.is_ascii_alphabetic())
        && token.parse::<Ipv4Addr>().is_err()
}

pub fn is_ipv4(token: &str) -> bool {
    token.parse::<Ipv4Addr>().is_ok()
}

pub fn is_ipv6(token: &str) -> bool {
    token.contains(':') && token.parse::<Ipv6Addr>().is_ok()
}

/// Parses a port: canonical decimal digits fitting in a `u16`.
pub fn parse_port(token: &str) -> Option<u16> {
    if !is_canonical_uint(token) {
        return None;
    }
    token.parse().ok()
}

/// Validates a free-form endpoint word (API tag or opaque property).
pub fn validate_word(token: &str) -> Result<(), GrammarError> {
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(GrammarError::Endpoint {
            token: token.to_string(),
            reason: "expected a non-empty word without whitespace",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_shapes_are_disjoint() {
        let cases = [
            ("ucoin.twiced.fr", true, false, false, None),
            ("88.174.120.187", false, true, false, None),
            ("2001:db8::ff00:42:8329", false, false, true, None),
            ("9101", false, false, false, Some(9101)),
        ];
        for (token, server, v4, v6, port) in cases {
            assert_eq!(is_server(token), server, "{token}");
            assert_eq!(is_ipv4(token), v4, "{token}");
            assert_eq!(is_ipv6(token), v6, "{token}");
            assert_eq!(parse_port(token), port, "{token}");
        }
    }

    #[test]
    fn test_port_range() {
        assert_eq!(parse_port("65535"), Some(65535));
        assert_eq!(parse_port("65536"), None);
        assert_eq!(parse_port("-1"), None);
        assert_eq!(parse_port("09101"), None);
    }

    #[test]
    fn test_validate_word() {
        assert!(validate_word("WS2P").is_ok());
        assert!(validate_word("").is_err());
        assert!(validate_word("a b").is_err());
    }
}
