//! The `Version` / `Type` / `Currency` header opening most raw documents.

use crate::codec::{DocWriter, LineReader, ParseOptions};
use crate::error::{GrammarError, ParseError, ParseErrorKind};
use crate::grammar::parse_uint;
use crate::model::Currency;

/// Parses a protocol version token.
pub(crate) fn parse_version(token: &str) -> Result<u32, GrammarError> {
    let version = parse_uint(token, "version")?;
    u32::try_from(version).map_err(|_| GrammarError::Integer {
        field: "version",
        token: token.to_string(),
    })
}

/// Rejects a version other than the one the options require.
pub(crate) fn check_version(
    version: u32,
    options: &ParseOptions,
    position: usize,
) -> Result<(), ParseError> {
    match options.expected_version {
        Some(expected) if expected != version => Err(ParseError::new(
            ParseErrorKind::UnsupportedVersion {
                expected,
                found: version,
            },
            position,
        )),
        _ => Ok(()),
    }
}

/// Reads the three header lines and returns the version and currency.
pub(crate) fn read_header(
    reader: &mut LineReader<'_>,
    doc_type: &'static str,
    options: &ParseOptions,
) -> Result<(u32, Currency), ParseError> {
    let version = reader.field("Version")?;
    let version = reader.token(parse_version(version))?;
    check_version(version, options, reader.last_position())?;

    let found = reader.field("Type")?;
    if found != doc_type {
        return Err(reader.error(ParseErrorKind::UnexpectedField {
            expected: doc_type,
            found: format!("Type: {found}"),
        }));
    }

    let currency = reader.field("Currency")?;
    let currency = reader.token(Currency::new(currency))?;
    Ok((version, currency))
}

/// Writes the three header lines.
pub(crate) fn write_header(writer: &mut DocWriter, version: u32, doc_type: &str, currency: &Currency) {
    writer.field("Version", version);
    writer.field("Type", doc_type);
    writer.field("Currency", currency);
}
