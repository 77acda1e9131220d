//! Token grammar for uCoin documents.
//!
//! Every textual field passes through one of these validators before it is
//! stored in a document. They never panic on untrusted input: a token either
//! satisfies its rule or yields a [`GrammarError`].

pub mod endpoint;

use crate::error::GrammarError;
use crate::limits::{
    BASE58_ALPHABET, HASH_MAX_LEN, HASH_MIN_LEN, PUBKEY_MAX_LEN, PUBKEY_MIN_LEN,
};

/// Validates a base58 public key.
///
/// Public keys are 43 to 46 characters drawn from the base58 alphabet, which
/// excludes `0`, `O`, `I` and `l`.
pub fn validate_pubkey(token: &str) -> Result<(), GrammarError> {
    let len = token.len();
    if !(PUBKEY_MIN_LEN..=PUBKEY_MAX_LEN).contains(&len) || !token.chars().all(is_base58) {
        return Err(GrammarError::PublicKey {
            token: token.to_string(),
        });
    }
    Ok(())
}

/// Validates a base64 signature with optional `=` or `==` padding.
pub fn validate_signature(token: &str) -> Result<(), GrammarError> {
    let body = token
        .strip_suffix("==")
        .or_else(|| token.strip_suffix('='))
        .unwrap_or(token);
    if body.is_empty() || !body.bytes().all(is_base64) {
        return Err(GrammarError::Signature {
            token: token.to_string(),
        });
    }
    Ok(())
}

/// Validates a hex hash of 5 to 40 characters.
pub fn validate_hash(token: &str) -> Result<(), GrammarError> {
    let len = token.len();
    if !(HASH_MIN_LEN..=HASH_MAX_LEN).contains(&len)
        || !token.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(GrammarError::Hash {
            token: token.to_string(),
        });
    }
    Ok(())
}

/// Parses an unsigned decimal integer.
///
/// Only canonical ASCII digits are accepted: no sign, no whitespace, no
/// separators, and no leading zero unless the value is `0` itself, so the
/// written form always matches the parsed one.
pub fn parse_uint(token: &str, field: &'static str) -> Result<u64, GrammarError> {
    if !is_canonical_uint(token) {
        return Err(GrammarError::Integer {
            field,
            token: token.to_string(),
        });
    }
    token.parse().map_err(|_| GrammarError::Integer {
        field,
        token: token.to_string(),
    })
}

/// Returns true for a non-empty run of ASCII digits without a redundant
/// leading zero.
pub(crate) fn is_canonical_uint(token: &str) -> bool {
    !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'))
}

/// Validates a user id: non-empty, single line.
pub fn validate_uid(token: &str) -> Result<(), GrammarError> {
    if token.is_empty() || has_line_break(token) {
        return Err(GrammarError::Uid {
            token: token.to_string(),
        });
    }
    Ok(())
}

/// Validates a currency name: non-empty, single line.
pub fn validate_currency(token: &str) -> Result<(), GrammarError> {
    if token.is_empty() || has_line_break(token) {
        return Err(GrammarError::Currency {
            token: token.to_string(),
        });
    }
    Ok(())
}

/// Validates a transaction comment: may be empty, single line.
pub fn validate_comment(comment: &str) -> Result<(), GrammarError> {
    if has_line_break(comment) {
        return Err(GrammarError::Comment);
    }
    Ok(())
}

/// Returns true if the line matches the signature grammar.
///
/// Used by line scanners to detect where a signature section begins.
pub fn is_signature(line: &str) -> bool {
    validate_signature(line).is_ok()
}

fn is_base58(c: char) -> bool {
    BASE58_ALPHABET.contains(c)
}

fn is_base64(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'/'
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\n', '\r'])
}
