//! Line-level reading and writing shared by the document codecs.
//!
//! Documents are sequences of `\n`-terminated lines. Fields are either
//! labeled (`Label: value`) or bare tokens; inline forms split a single line
//! on `:`.

use std::fmt::{Display, Write as _};

use crate::codec::ParseOptions;
use crate::error::{GrammarError, ParseError, ParseErrorKind};
use crate::model::Signature;

// =============================================================================
// DECODING
// =============================================================================

/// Reader over the lines of a document.
///
/// Positions are 1-based line numbers. Errors about a line that was just
/// consumed are reported at that line; truncation is reported at the line
/// that is missing.
#[derive(Debug, Clone)]
pub struct LineReader<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineReader<'a> {
    /// Splits `text` into lines, enforcing the length limit and requiring
    /// every line (including the last) to end with `\n`.
    pub fn new(text: &'a str, options: &ParseOptions) -> Result<Self, ParseError> {
        if text.len() > options.max_document_len {
            return Err(ParseError::new(
                ParseErrorKind::TooLarge {
                    len: text.len(),
                    max: options.max_document_len,
                },
                1,
            ));
        }

        let mut lines = Vec::new();
        for (i, line) in text.split_inclusive('\n').enumerate() {
            let Some(line) = line.strip_suffix('\n') else {
                return Err(ParseError::new(
                    ParseErrorKind::Malformed {
                        context: "line",
                        reason: "missing trailing newline".to_string(),
                    },
                    i + 1,
                ));
            };
            lines.push(line);
        }
        Ok(Self { lines, pos: 0 })
    }

    /// Returns the number of the next line to be read.
    pub fn position(&self) -> usize {
        self.pos + 1
    }

    /// Returns the number of the last consumed line (1 before any read).
    pub fn last_position(&self) -> usize {
        self.pos.max(1)
    }

    /// Returns true if every line has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.lines.len()
    }

    /// Returns the number of lines not yet consumed.
    pub fn remaining_len(&self) -> usize {
        self.lines.len().saturating_sub(self.pos)
    }

    /// Returns the next line without consuming it.
    pub fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    /// Reads the next line.
    pub fn next_line(&mut self, expected: &'static str) -> Result<&'a str, ParseError> {
        let Some(line) = self.lines.get(self.pos).copied() else {
            return Err(ParseError::new(
                ParseErrorKind::Truncated { expected },
                self.position(),
            ));
        };
        self.pos += 1;
        Ok(line)
    }

    /// Reads a `Label: value` line and returns the value.
    pub fn field(&mut self, label: &'static str) -> Result<&'a str, ParseError> {
        let line = self.next_line(label)?;
        line.strip_prefix(label)
            .and_then(|rest| rest.strip_prefix(": "))
            .ok_or_else(|| self.unexpected(label, line))
    }

    /// Reads a line starting with `prefix` and returns the remainder.
    pub fn prefixed(&mut self, prefix: &'static str) -> Result<&'a str, ParseError> {
        let line = self.next_line(prefix)?;
        line.strip_prefix(prefix)
            .ok_or_else(|| self.unexpected(prefix, line))
    }

    /// Reads a line that must equal `expected` exactly.
    ///
    /// `label` names the expectation in the error.
    pub fn expect_line(&mut self, expected: &str, label: &'static str) -> Result<(), ParseError> {
        let line = self.next_line(label)?;
        if line != expected {
            return Err(self.unexpected(label, line));
        }
        Ok(())
    }

    /// Reads the single trailing signature of a single-signer document.
    pub fn single_signature(&mut self) -> Result<Signature, ParseError> {
        let line = self.next_line("signature")?;
        let signature = self.token(Signature::new(line))?;
        if let Some(extra) = self.peek() {
            self.pos += 1;
            return Err(self.unexpected("end of document", extra));
        }
        Ok(signature)
    }

    /// Reads every remaining line as a signature.
    pub fn signatures(&mut self) -> Result<Vec<Signature>, ParseError> {
        let mut signatures = Vec::with_capacity(self.remaining_len());
        while let Some(line) = self.peek() {
            self.pos += 1;
            signatures.push(self.token(Signature::new(line))?);
        }
        Ok(signatures)
    }

    /// Converts a token result into a parse result at the last consumed line.
    pub fn token<T>(&self, result: Result<T, GrammarError>) -> Result<T, ParseError> {
        result.map_err(|e| self.error(e))
    }

    /// Builds an error at the last consumed line.
    pub fn error(&self, kind: impl Into<ParseErrorKind>) -> ParseError {
        ParseError::new(kind, self.last_position())
    }

    /// Moves an error produced by a sub-parser onto the last consumed line.
    pub fn relocate(&self, err: ParseError) -> ParseError {
        ParseError {
            position: self.last_position(),
            ..err
        }
    }

    fn unexpected(&self, expected: &'static str, found: &str) -> ParseError {
        self.error(ParseErrorKind::UnexpectedField {
            expected,
            found: found.to_string(),
        })
    }
}

/// Splits a single-line inline form into exactly `arity` `:`-separated fields.
///
/// One trailing `\n` is tolerated. The last field keeps any further `:`.
pub fn split_inline<'a>(
    inline: &'a str,
    arity: usize,
    context: &'static str,
) -> Result<Vec<&'a str>, ParseError> {
    let inline = inline.strip_suffix('\n').unwrap_or(inline);
    if inline.contains('\n') {
        return Err(malformed(context, "inline form spans several lines"));
    }
    let fields: Vec<&str> = inline.splitn(arity, ':').collect();
    if fields.len() != arity {
        return Err(malformed(
            context,
            format!("expected {arity} fields, found {}", fields.len()),
        ));
    }
    Ok(fields)
}

/// Converts a token result from an inline form into a `Malformed` error.
pub fn inline_token<T>(
    context: &'static str,
    result: Result<T, GrammarError>,
) -> Result<T, ParseError> {
    result.map_err(|e| malformed(context, e))
}

/// Builds a `Malformed` error on line 1.
pub fn malformed(context: &'static str, reason: impl Display) -> ParseError {
    ParseError::new(
        ParseErrorKind::Malformed {
            context,
            reason: reason.to_string(),
        },
        1,
    )
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for line-oriented documents.
#[derive(Debug, Clone, Default)]
pub struct DocWriter {
    buf: String,
}

impl DocWriter {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: String::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
        }
    }

    /// Writes a `Label: value` line.
    pub fn field(&mut self, label: &str, value: impl Display) {
        // Writing into a String cannot fail.
        let _ = writeln!(self.buf, "{label}: {value}");
    }

    /// Writes a bare line.
    pub fn line(&mut self, value: impl Display) {
        let _ = writeln!(self.buf, "{value}");
    }

    /// Writes one line per item.
    pub fn lines<I>(&mut self, items: I)
    where
        I: IntoIterator,
        I::Item: Display,
    {
        for item in items {
            self.line(item);
        }
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the written text.
    pub fn into_string(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_requires_trailing_newline() {
        let err = LineReader::new("Version: 1\nType: Peer", &ParseOptions::new()).unwrap_err();
        assert_eq!(err.position, 2);
        assert!(matches!(err.kind, ParseErrorKind::Malformed { context: "line", .. }));
    }

    #[test]
    fn test_reader_length_limit() {
        let options = ParseOptions {
            max_document_len: 4,
            ..ParseOptions::default()
        };
        let err = LineReader::new("Version: 1\n", &options).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TooLarge { len: 11, max: 4 });
    }

    #[test]
    fn test_field_label_mismatch() {
        let mut reader = LineReader::new("Version: 1\nCurency: x\n", &ParseOptions::new()).unwrap();
        assert_eq!(reader.field("Version").unwrap(), "1");
        let err = reader.field("Currency").unwrap_err();
        assert_eq!(err.position, 2);
        assert_eq!(
            err.kind,
            ParseErrorKind::UnexpectedField {
                expected: "Currency",
                found: "Curency: x".to_string()
            }
        );
    }

    #[test]
    fn test_truncated_points_at_missing_line() {
        let mut reader = LineReader::new("Version: 1\n", &ParseOptions::new()).unwrap();
        reader.field("Version").unwrap();
        let err = reader.field("Type").unwrap_err();
        assert_eq!(err.position, 2);
        assert_eq!(err.kind, ParseErrorKind::Truncated { expected: "Type" });
    }

    #[test]
    fn test_single_signature_rejects_extra_line() {
        let mut reader = LineReader::new("SIG\nMORE\n", &ParseOptions::new()).unwrap();
        let err = reader.single_signature().unwrap_err();
        assert_eq!(err.position, 2);
        assert!(matches!(
            err.kind,
            ParseErrorKind::UnexpectedField { expected: "end of document", .. }
        ));

        let mut empty = LineReader::new("", &ParseOptions::new()).unwrap();
        assert!(matches!(
            empty.single_signature().unwrap_err().kind,
            ParseErrorKind::Truncated { expected: "signature" }
        ));
    }

    #[test]
    fn test_split_inline() {
        assert_eq!(split_inline("a:b:c:d:e\n", 4, "test").unwrap(), vec!["a", "b", "c", "d:e"]);
        assert!(split_inline("a:b", 4, "test").is_err());
        assert!(split_inline("a:b\nc:d", 2, "test").is_err());
    }

    #[test]
    fn test_writer() {
        let mut writer = DocWriter::new();
        writer.field("Version", 1);
        writer.line("Endpoints:");
        writer.lines(["a", "b"]);
        assert_eq!(writer.into_string(), "Version: 1\nEndpoints:\na\nb\n");
    }
}
