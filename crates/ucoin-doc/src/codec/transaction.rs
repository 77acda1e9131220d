//! Transaction formats.
//!
//! Raw form:
//!
//! ```text
//! Version: VERSION
//! Type: Transaction
//! Currency: CURRENCY_NAME
//! Issuers:
//! PUBLIC_KEY
//! Inputs:
//! INDEX:SOURCE:NUMBER:FINGERPRINT:AMOUNT
//! Outputs:
//! PUBLIC_KEY:AMOUNT
//! Comment: COMMENT
//! SIGNATURE
//! ```
//!
//! Compact form:
//!
//! ```text
//! TX:VERSION:NB_ISSUERS:NB_INPUTS:NB_OUTPUTS:HAS_COMMENT
//! PUBLIC_KEY
//! INDEX:SOURCE:NUMBER:FINGERPRINT:AMOUNT
//! PUBLIC_KEY:AMOUNT
//! COMMENT
//! SIGNATURE
//! ```
//!
//! Inputs not yet bound to an issuer omit `INDEX` in both forms.

use crate::codec::header::{check_version, parse_version, read_header, write_header};
use crate::codec::primitives::{inline_token, malformed, split_inline};
use crate::codec::{DocWriter, LineReader, ParseOptions};
use crate::error::{ParseError, ParseErrorKind};
use crate::grammar::{is_signature, parse_uint};
use crate::limits::{MAX_TX_INPUTS, MAX_TX_ISSUERS, MAX_TX_OUTPUTS};
use crate::model::document::Document;
use crate::model::{
    Currency, HexHash, InputSource, OutputSource, PublicKey, Signature, SimpleTransaction,
    SourceType, Transaction,
};

const INPUT_INLINE: &str = "input";
const OUTPUT_INLINE: &str = "output";
const COMMENT_PREFIX: &str = "Comment: ";

// =============================================================================
// INPUTS AND OUTPUTS
// =============================================================================

impl InputSource {
    /// Parses `index:source:number:txhash:amount`, or the unbound
    /// `source:number:txhash:amount`. The variant is chosen by field count.
    pub fn from_inline(inline: &str) -> Result<Self, ParseError> {
        let inline = inline.strip_suffix('\n').unwrap_or(inline);
        let fields: Vec<&str> = inline.split(':').collect();
        let (index, fields) = match fields.as_slice() {
            [index, rest @ ..] if rest.len() == 4 => {
                let index = inline_token(INPUT_INLINE, parse_uint(index, "input index"))?;
                let index = usize::try_from(index)
                    .map_err(|_| malformed(INPUT_INLINE, "input index out of range"))?;
                (Some(index), rest)
            }
            rest if rest.len() == 4 => (None, rest),
            _ => {
                return Err(malformed(
                    INPUT_INLINE,
                    format!("expected 4 or 5 fields, found {}", fields.len()),
                ));
            }
        };

        let source: SourceType = inline_token(INPUT_INLINE, fields[0].parse())?;
        let number = inline_token(INPUT_INLINE, parse_uint(fields[1], "source number"))?;
        let txhash = inline_token(INPUT_INLINE, HexHash::new(fields[2]))?;
        let amount = inline_token(INPUT_INLINE, parse_uint(fields[3], "amount"))?;
        Ok(InputSource::new(index, source, number, txhash, amount))
    }

    /// Returns the inline form; the index is omitted while unbound.
    pub fn inline(&self) -> String {
        match self.index {
            Some(index) => format!(
                "{}:{}:{}:{}:{}",
                index, self.source, self.number, self.txhash, self.amount
            ),
            None => format!("{}:{}:{}:{}", self.source, self.number, self.txhash, self.amount),
        }
    }
}

impl OutputSource {
    /// Parses `pubkey:amount`.
    pub fn from_inline(inline: &str) -> Result<Self, ParseError> {
        let fields = split_inline(inline, 2, OUTPUT_INLINE)?;
        let pubkey = inline_token(OUTPUT_INLINE, PublicKey::new(fields[0]))?;
        let amount = inline_token(OUTPUT_INLINE, parse_uint(fields[1], "amount"))?;
        Ok(OutputSource::new(pubkey, amount))
    }

    /// Returns `pubkey:amount`.
    pub fn inline(&self) -> String {
        format!("{}:{}", self.pubkey, self.amount)
    }
}

// =============================================================================
// RAW FORM
// =============================================================================

pub(crate) fn transaction_raw(tx: &Transaction) -> String {
    let mut writer = DocWriter::with_capacity(256 + tx.inputs().len() * 64);
    write_header(&mut writer, tx.version(), Transaction::DOC_TYPE, tx.currency());
    writer.line("Issuers:");
    writer.lines(tx.issuers());
    writer.line("Inputs:");
    writer.lines(tx.inputs().iter().map(InputSource::inline));
    writer.line("Outputs:");
    writer.lines(tx.outputs().iter().map(OutputSource::inline));
    writer.line(format_args!("{COMMENT_PREFIX}{}", tx.comment()));
    writer.into_string()
}

/// Where the raw-form scanner is.
///
/// States only move forward; a section header may be skipped when its list
/// is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum RawState {
    Header,
    InIssuers,
    InInputs,
    InOutputs,
    InComment,
    InSignatures,
}

impl RawState {
    /// The state a marker line opens, if the line is a marker.
    fn opened_by(line: &str) -> Option<RawState> {
        match line {
            "Issuers:" => Some(RawState::InIssuers),
            "Inputs:" => Some(RawState::InInputs),
            "Outputs:" => Some(RawState::InOutputs),
            _ if line.starts_with(COMMENT_PREFIX) => Some(RawState::InComment),
            _ => None,
        }
    }

    /// What the scanner expects next, for error messages.
    fn expected(self) -> &'static str {
        match self {
            RawState::Header => "Issuers:",
            RawState::InIssuers => "issuer",
            RawState::InInputs => "input",
            RawState::InOutputs => "output",
            RawState::InComment => "Comment",
            RawState::InSignatures => "signature",
        }
    }
}

/// Sections collected by the scanners.
#[derive(Debug, Default)]
struct Sections {
    issuers: Vec<PublicKey>,
    inputs: Vec<InputSource>,
    outputs: Vec<OutputSource>,
    comment: String,
    signatures: Vec<Signature>,
}

impl Sections {
    fn build(self, version: u32, currency: Currency, reader: &LineReader<'_>) -> Result<Transaction, ParseError> {
        Transaction::new(
            version,
            currency,
            self.issuers,
            self.inputs,
            self.outputs,
            self.comment,
        )
        .and_then(|tx| tx.with_signatures(self.signatures))
        .map_err(|e| reader.error(e))
    }
}

fn check_section(reader: &LineReader<'_>, section: &'static str, len: usize, max: usize) -> Result<(), ParseError> {
    if len >= max {
        return Err(reader.error(ParseErrorKind::SectionTooLarge { section, max }));
    }
    Ok(())
}

fn scan_raw(reader: &mut LineReader<'_>) -> Result<Sections, ParseError> {
    let mut sections = Sections::default();
    let mut state = RawState::Header;

    while let Some(line) = reader.peek() {
        if state == RawState::InSignatures {
            sections.signatures = reader.signatures()?;
            break;
        }
        if state == RawState::InComment {
            reader.next_line("Comment")?;
            // The marker check guarantees the prefix.
            sections.comment = line.strip_prefix(COMMENT_PREFIX).unwrap_or_default().to_string();
            state = RawState::InSignatures;
            continue;
        }

        if let Some(next) = RawState::opened_by(line) {
            if next <= state {
                reader.next_line(state.expected())?;
                return Err(reader.error(ParseErrorKind::UnexpectedField {
                    expected: state.expected(),
                    found: line.to_string(),
                }));
            }
            if next != RawState::InComment {
                reader.next_line(state.expected())?;
            }
            state = next;
            continue;
        }

        reader.next_line(state.expected())?;
        match state {
            RawState::Header => {
                return Err(reader.error(ParseErrorKind::UnexpectedField {
                    expected: state.expected(),
                    found: line.to_string(),
                }));
            }
            RawState::InIssuers => {
                check_section(reader, "Issuers", sections.issuers.len(), MAX_TX_ISSUERS)?;
                sections.issuers.push(reader.token(PublicKey::new(line))?);
            }
            RawState::InInputs => {
                check_section(reader, "Inputs", sections.inputs.len(), MAX_TX_INPUTS)?;
                let input = InputSource::from_inline(line).map_err(|e| reader.relocate(e))?;
                sections.inputs.push(input);
            }
            RawState::InOutputs => {
                check_section(reader, "Outputs", sections.outputs.len(), MAX_TX_OUTPUTS)?;
                let output = OutputSource::from_inline(line).map_err(|e| reader.relocate(e))?;
                sections.outputs.push(output);
            }
            RawState::InComment | RawState::InSignatures => {}
        }
    }

    if state < RawState::InSignatures {
        return Err(ParseError::new(
            ParseErrorKind::Truncated {
                expected: "Comment",
            },
            reader.position(),
        ));
    }
    Ok(sections)
}

impl Transaction {
    /// Parses the signed-raw form.
    pub fn from_signed_raw(text: &str) -> Result<Self, ParseError> {
        Self::from_signed_raw_with_options(text, &ParseOptions::default())
    }

    /// Parses the signed-raw form with the given options.
    pub fn from_signed_raw_with_options(text: &str, options: &ParseOptions) -> Result<Self, ParseError> {
        let mut reader = LineReader::new(text, options)?;
        let (version, currency) = read_header(&mut reader, Self::DOC_TYPE, options)?;
        let sections = scan_raw(&mut reader)?;
        let tx = sections.build(version, currency, &reader)?;
        tracing::trace!(
            issuers = tx.issuers().len(),
            inputs = tx.inputs().len(),
            outputs = tx.outputs().len(),
            "transaction parsed"
        );
        Ok(tx)
    }
}

// =============================================================================
// COMPACT FORM
// =============================================================================

/// The compact header: `TX:version:issuers:inputs:outputs:has_comment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CompactHeader {
    version: u32,
    issuers: usize,
    inputs: usize,
    outputs: usize,
    has_comment: bool,
}

impl CompactHeader {
    fn parse(reader: &mut LineReader<'_>, options: &ParseOptions) -> Result<Self, ParseError> {
        let line = reader.next_line("TX")?;
        let fields: Vec<&str> = line.split(':').collect();
        let [tag, version, issuers, inputs, outputs, has_comment] = fields.as_slice() else {
            return Err(reader.error(ParseErrorKind::Malformed {
                context: "compact header",
                reason: format!("expected 6 fields, found {}", fields.len()),
            }));
        };
        if *tag != "TX" {
            return Err(reader.error(ParseErrorKind::UnexpectedField {
                expected: "TX",
                found: line.to_string(),
            }));
        }

        let version = reader.token(parse_version(version))?;
        check_version(version, options, reader.last_position())?;
        let issuers = count(reader, issuers, "Issuers", MAX_TX_ISSUERS)?;
        let inputs = count(reader, inputs, "Inputs", MAX_TX_INPUTS)?;
        let outputs = count(reader, outputs, "Outputs", MAX_TX_OUTPUTS)?;
        let has_comment = match *has_comment {
            "0" => false,
            "1" => true,
            other => {
                return Err(reader.error(ParseErrorKind::Malformed {
                    context: "compact header",
                    reason: format!("comment flag must be 0 or 1, found {other:?}"),
                }));
            }
        };

        Ok(Self {
            version,
            issuers,
            inputs,
            outputs,
            has_comment,
        })
    }
}

fn count(reader: &LineReader<'_>, token: &str, section: &'static str, max: usize) -> Result<usize, ParseError> {
    let n = reader.token(parse_uint(token, section))?;
    match usize::try_from(n) {
        Ok(n) if n <= max => Ok(n),
        _ => Err(reader.error(ParseErrorKind::SectionTooLarge { section, max })),
    }
}

/// Reads exactly `declared` items of one compact section.
///
/// A shortfall is reported as `CountMismatch` when the offending line fits
/// the grammar of what follows (`fits_next`); an excess when the line after
/// the last declared item still fits this section (`fits_own`).
fn read_section<T>(
    reader: &mut LineReader<'_>,
    section: &'static str,
    declared: usize,
    parse: impl Fn(&str) -> Result<T, ParseError>,
    fits_next: impl Fn(&str) -> bool,
    fits_own: Option<&dyn Fn(&str) -> bool>,
) -> Result<Vec<T>, ParseError> {
    let mut items = Vec::with_capacity(declared);
    for actual in 0..declared {
        let line = reader.next_line(section)?;
        match parse(line) {
            Ok(item) => items.push(item),
            Err(_) if fits_next(line) => {
                return Err(reader.error(ParseErrorKind::CountMismatch {
                    section,
                    declared,
                    actual,
                }));
            }
            Err(e) => return Err(reader.relocate(e)),
        }
    }

    if let Some(fits_own) = fits_own {
        let first_extra = reader.position();
        let mut extra = 0;
        while reader.peek().is_some_and(fits_own) {
            reader.next_line(section)?;
            extra += 1;
        }
        if extra > 0 {
            return Err(ParseError::new(
                ParseErrorKind::CountMismatch {
                    section,
                    declared,
                    actual: declared + extra,
                },
                first_extra,
            ));
        }
    }
    Ok(items)
}

fn is_pubkey(line: &str) -> bool {
    PublicKey::new(line).is_ok()
}

fn is_input(line: &str) -> bool {
    InputSource::from_inline(line).is_ok()
}

fn is_output(line: &str) -> bool {
    OutputSource::from_inline(line).is_ok()
}

impl Transaction {
    /// Parses the compact form. The currency is not part of the text.
    pub fn from_compact(currency: Currency, text: &str) -> Result<Self, ParseError> {
        Self::from_compact_with_options(currency, text, &ParseOptions::default())
    }

    /// Parses the compact form with the given options.
    pub fn from_compact_with_options(
        currency: Currency,
        text: &str,
        options: &ParseOptions,
    ) -> Result<Self, ParseError> {
        let mut reader = LineReader::new(text, options)?;
        let header = CompactHeader::parse(&mut reader, options)?;

        let issuers = read_section(
            &mut reader,
            "Issuers",
            header.issuers,
            |line| PublicKey::new(line).map_err(|e| ParseError::new(e, 1)),
            is_input,
            Some(&is_pubkey),
        )?;
        let inputs = read_section(
            &mut reader,
            "Inputs",
            header.inputs,
            InputSource::from_inline,
            is_output,
            Some(&is_input),
        )?;
        // With a comment declared, any line after the outputs may be the
        // comment, so excess outputs cannot be told apart from it.
        let extra_outputs: Option<&dyn Fn(&str) -> bool> =
            if header.has_comment { None } else { Some(&is_output) };
        let outputs = read_section(
            &mut reader,
            "Outputs",
            header.outputs,
            OutputSource::from_inline,
            |line| !header.has_comment && is_signature(line),
            extra_outputs,
        )?;

        let comment = if header.has_comment {
            let line = reader.next_line("comment")?;
            if line.is_empty() {
                return Err(reader.error(ParseErrorKind::Malformed {
                    context: "comment",
                    reason: "declared comment is empty".to_string(),
                }));
            }
            line.to_string()
        } else {
            String::new()
        };
        let signatures = reader.signatures()?;

        let sections = Sections {
            issuers,
            inputs,
            outputs,
            comment,
            signatures,
        };
        sections.build(header.version, currency, &reader)
    }

    /// Returns the compact form, signatures included.
    pub fn compact(&self) -> String {
        let mut writer = DocWriter::with_capacity(128 + self.inputs().len() * 64);
        let has_comment = if self.comment().is_empty() { 0 } else { 1 };
        writer.line(format_args!(
            "TX:{}:{}:{}:{}:{}",
            self.version(),
            self.issuers().len(),
            self.inputs().len(),
            self.outputs().len(),
            has_comment
        ));
        writer.lines(self.issuers());
        writer.lines(self.inputs().iter().map(InputSource::inline));
        writer.lines(self.outputs().iter().map(OutputSource::inline));
        if !self.comment().is_empty() {
            writer.line(self.comment());
        }
        writer.lines(self.signatures());
        writer.into_string()
    }
}

impl SimpleTransaction {
    /// Parses the signed-raw form of a single-issuer, single-input transaction.
    pub fn from_signed_raw(text: &str) -> Result<Self, ParseError> {
        let tx = Transaction::from_signed_raw(text)?;
        SimpleTransaction::try_from(tx).map_err(|e| ParseError::new(e, 1))
    }

    /// Parses the compact form of a single-issuer, single-input transaction.
    pub fn from_compact(currency: Currency, text: &str) -> Result<Self, ParseError> {
        let tx = Transaction::from_compact(currency, text)?;
        SimpleTransaction::try_from(tx).map_err(|e| ParseError::new(e, 1))
    }
}
