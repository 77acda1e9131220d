//! Transaction documents and their input/output records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, GrammarError, InvariantViolation};
use crate::grammar::validate_comment;
use crate::limits::{MAX_TX_INPUTS, MAX_TX_ISSUERS, MAX_TX_OUTPUTS};
use crate::model::document::{check_section_len, Document, Envelope};
use crate::model::{Currency, HexHash, PublicKey, Signature};
use crate::signer::{sign_raw, Signer};

/// Where the money spent by an input comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    /// Universal dividend (`D`).
    #[serde(rename = "D")]
    Dividend,
    /// Output of a previous transaction (`T`).
    #[serde(rename = "T")]
    Transaction,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Dividend => "D",
            SourceType::Transaction => "T",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "D" => Ok(SourceType::Dividend),
            "T" => Ok(SourceType::Transaction),
            _ => Err(GrammarError::SourceType {
                token: s.to_string(),
            }),
        }
    }
}

/// A source of money consumed by a transaction.
///
/// `index` designates the issuer (by position in the transaction's issuer
/// list) that owns the source. It is `None` until the input is bound to a
/// transaction, e.g. when it was built from a [`SourceSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InputSource {
    pub index: Option<usize>,
    pub source: SourceType,
    pub number: u64,
    pub txhash: HexHash,
    pub amount: u64,
}

impl InputSource {
    pub fn new(
        index: Option<usize>,
        source: SourceType,
        number: u64,
        txhash: HexHash,
        amount: u64,
    ) -> Self {
        Self {
            index,
            source,
            number,
            txhash,
            amount,
        }
    }

    /// Binds the input to the issuer at `index`.
    pub fn bind(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn is_bound(&self) -> bool {
        self.index.is_some()
    }
}

/// A source as summarized by a node's source listing:
/// `{"type": "D", "number": 12, "fingerprint": "...", "amount": 100}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    #[serde(rename = "type")]
    pub source: SourceType,
    pub number: u64,
    pub fingerprint: HexHash,
    pub amount: u64,
}

impl InputSource {
    /// Turns a node's source summary into an unbound input.
    pub fn from_summary(summary: SourceSummary) -> Self {
        InputSource::new(
            None,
            summary.source,
            summary.number,
            summary.fingerprint,
            summary.amount,
        )
    }
}

impl From<SourceSummary> for InputSource {
    fn from(summary: SourceSummary) -> Self {
        InputSource::from_summary(summary)
    }
}

/// Money credited to a public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OutputSource {
    pub pubkey: PublicKey,
    pub amount: u64,
}

impl OutputSource {
    pub fn new(pubkey: PublicKey, amount: u64) -> Self {
        Self { pubkey, amount }
    }
}

/// A transfer of money from one or more issuers.
///
/// Signatures are aligned with issuers: once signed, there is exactly one
/// signature per issuer, in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    #[serde(flatten)]
    envelope: Envelope,
    issuers: Vec<PublicKey>,
    inputs: Vec<InputSource>,
    outputs: Vec<OutputSource>,
    comment: String,
}

impl Transaction {
    /// Creates an unsigned transaction.
    pub fn new(
        version: u32,
        currency: Currency,
        issuers: Vec<PublicKey>,
        inputs: Vec<InputSource>,
        outputs: Vec<OutputSource>,
        comment: impl Into<String>,
    ) -> Result<Self, InvariantViolation> {
        let comment = comment.into();
        validate_comment(&comment)?;
        if issuers.is_empty() {
            return Err(InvariantViolation::NoIssuers);
        }
        if inputs.is_empty() {
            return Err(InvariantViolation::NoInputs);
        }
        if outputs.is_empty() {
            return Err(InvariantViolation::NoOutputs);
        }
        check_section_len("Issuers", issuers.len(), MAX_TX_ISSUERS)?;
        check_section_len("Inputs", inputs.len(), MAX_TX_INPUTS)?;
        check_section_len("Outputs", outputs.len(), MAX_TX_OUTPUTS)?;
        for (position, input) in inputs.iter().enumerate() {
            if let Some(index) = input.index.filter(|&i| i >= issuers.len()) {
                return Err(InvariantViolation::InputIndexOutOfRange {
                    position,
                    index,
                    issuers: issuers.len(),
                });
            }
        }
        Ok(Self {
            envelope: Envelope::new(version, currency),
            issuers,
            inputs,
            outputs,
            comment,
        })
    }

    pub fn issuers(&self) -> &[PublicKey] {
        &self.issuers
    }

    pub fn inputs(&self) -> &[InputSource] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputSource] {
        &self.outputs
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Returns true when every issuer has signed.
    pub fn is_signed(&self) -> bool {
        !self.envelope.signatures.is_empty()
    }

    /// Returns a copy carrying the given signatures.
    ///
    /// The list must be empty or hold exactly one signature per issuer.
    pub fn with_signatures(mut self, signatures: Vec<Signature>) -> Result<Self, InvariantViolation> {
        self.check_signatures(signatures.len())?;
        self.envelope.signatures = signatures;
        Ok(self)
    }

    /// Signs the raw form with one key per issuer, in issuer order, replacing
    /// any existing signatures.
    pub fn sign(&mut self, keys: &[&dyn Signer]) -> Result<(), Error> {
        if keys.len() != self.issuers.len() {
            return Err(InvariantViolation::SignatureCountMismatch {
                document: Self::DOC_TYPE,
                expected: self.issuers.len(),
                actual: keys.len(),
            }
            .into());
        }
        self.envelope.signatures = sign_raw(&self.raw(), keys)?;
        Ok(())
    }

    /// Consumes the transaction and returns it signed.
    pub fn signed(mut self, keys: &[&dyn Signer]) -> Result<Self, Error> {
        self.sign(keys)?;
        Ok(self)
    }

    fn check_signatures(&self, count: usize) -> Result<(), InvariantViolation> {
        if count != 0 && count != self.issuers.len() {
            return Err(InvariantViolation::SignatureCountMismatch {
                document: Self::DOC_TYPE,
                expected: self.issuers.len(),
                actual: count,
            });
        }
        Ok(())
    }
}

impl Document for Transaction {
    const DOC_TYPE: &'static str = "Transaction";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn raw(&self) -> String {
        crate::codec::transaction::transaction_raw(self)
    }
}

/// A transaction with a single issuer spending a single input.
///
/// Uses the regular transaction formats; it only narrows what can be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SimpleTransaction(Transaction);

impl SimpleTransaction {
    /// Creates an unsigned simple transaction. The input is bound to the issuer.
    pub fn new(
        version: u32,
        currency: Currency,
        issuer: PublicKey,
        input: InputSource,
        outputs: Vec<OutputSource>,
        comment: impl Into<String>,
    ) -> Result<Self, InvariantViolation> {
        let tx = Transaction::new(
            version,
            currency,
            vec![issuer],
            vec![input.bind(0)],
            outputs,
            comment,
        )?;
        Ok(Self(tx))
    }

    pub fn issuer(&self) -> &PublicKey {
        &self.0.issuers[0]
    }

    pub fn input(&self) -> &InputSource {
        &self.0.inputs[0]
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.0.envelope.signatures.first()
    }

    /// Signs with the issuer's key, replacing any existing signature.
    pub fn sign(&mut self, key: &dyn Signer) -> Result<(), Error> {
        self.0.sign(&[key])
    }

    pub fn transaction(&self) -> &Transaction {
        &self.0
    }

    pub fn into_transaction(self) -> Transaction {
        self.0
    }
}

impl TryFrom<Transaction> for SimpleTransaction {
    type Error = InvariantViolation;

    fn try_from(tx: Transaction) -> Result<Self, Self::Error> {
        if tx.issuers.len() != 1 || tx.inputs.len() != 1 {
            return Err(InvariantViolation::NotSimple {
                issuers: tx.issuers.len(),
                inputs: tx.inputs.len(),
            });
        }
        Ok(Self(tx))
    }
}

impl AsRef<Transaction> for SimpleTransaction {
    fn as_ref(&self) -> &Transaction {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::Ed25519Signer;

    const ISSUER: &str = "HsLShAtzXTVxeUtQd7yi5Z5Zh4zNvbu8sTEZ53nfKcqY";
    const OTHER: &str = "8Fi1VSTbjkXguwThF4v2ZxC5whK7pwG2vcGTkPUPjPGU";

    fn input(index: Option<usize>) -> InputSource {
        InputSource::new(
            index,
            SourceType::Dividend,
            12,
            HexHash::new("AB1234567890ABCDEF").unwrap(),
            100,
        )
    }

    fn output() -> OutputSource {
        OutputSource::new(PublicKey::new(OTHER).unwrap(), 100)
    }

    fn currency() -> Currency {
        Currency::new("beta_brousouf").unwrap()
    }

    #[test]
    fn test_transaction_requires_inputs_and_outputs() {
        let issuers = vec![PublicKey::new(ISSUER).unwrap()];
        let no_inputs = Transaction::new(1, currency(), issuers.clone(), vec![], vec![output()], "");
        assert_eq!(no_inputs.unwrap_err(), InvariantViolation::NoInputs);

        let no_outputs = Transaction::new(1, currency(), issuers, vec![input(Some(0))], vec![], "");
        assert_eq!(no_outputs.unwrap_err(), InvariantViolation::NoOutputs);

        let no_issuers = Transaction::new(1, currency(), vec![], vec![input(None)], vec![output()], "");
        assert_eq!(no_issuers.unwrap_err(), InvariantViolation::NoIssuers);
    }

    #[test]
    fn test_input_index_must_reference_an_issuer() {
        let result = Transaction::new(
            1,
            currency(),
            vec![PublicKey::new(ISSUER).unwrap()],
            vec![input(Some(0)), input(Some(1))],
            vec![output()],
            "",
        );
        assert_eq!(
            result.unwrap_err(),
            InvariantViolation::InputIndexOutOfRange {
                position: 1,
                index: 1,
                issuers: 1
            }
        );
    }

    #[test]
    fn test_comment_must_be_single_line() {
        let result = Transaction::new(
            1,
            currency(),
            vec![PublicKey::new(ISSUER).unwrap()],
            vec![input(Some(0))],
            vec![output()],
            "hello\nworld",
        );
        assert_eq!(result.unwrap_err(), InvariantViolation::Grammar(GrammarError::Comment));
    }

    #[test]
    fn test_signatures_align_with_issuers() {
        let tx = Transaction::new(
            1,
            currency(),
            vec![PublicKey::new(ISSUER).unwrap(), PublicKey::new(OTHER).unwrap()],
            vec![input(Some(0)), input(Some(1))],
            vec![output()],
            "",
        )
        .unwrap();

        let sig = Signature::new("SIG").unwrap();
        let result = tx.clone().with_signatures(vec![sig.clone()]);
        assert!(matches!(
            result,
            Err(InvariantViolation::SignatureCountMismatch { expected: 2, actual: 1, .. })
        ));

        let key = Ed25519Signer::from_seed([5u8; 32]);
        let mut tx = tx;
        assert!(tx.sign(&[&key]).is_err());
        assert!(!tx.is_signed());

        let other = Ed25519Signer::from_seed([6u8; 32]);
        tx.sign(&[&key, &other]).unwrap();
        assert_eq!(tx.signatures().len(), 2);
        tx.sign(&[&other, &key]).unwrap();
        assert_eq!(tx.signatures().len(), 2);
    }

    #[test]
    fn test_summary_builds_unbound_input() {
        let summary: SourceSummary = serde_json::from_str(
            r#"{"type": "T", "number": 42, "fingerprint": "6991C993631BED4733972ED7538E41CCC33660F5", "amount": 7}"#,
        )
        .unwrap();
        let input = InputSource::from_summary(summary);
        assert!(!input.is_bound());
        assert_eq!(input.source, SourceType::Transaction);
        assert_eq!(input.bind(0).index, Some(0));
    }

    #[test]
    fn test_summary_rejects_bad_fingerprint() {
        let result = serde_json::from_str::<SourceSummary>(
            r#"{"type": "D", "number": 1, "fingerprint": "not-hex", "amount": 7}"#,
        );
        assert!(result.is_err());

        let summary: SourceSummary = serde_json::from_str(
            r#"{"type": "D", "number": 1, "fingerprint": "ABCDEF0123", "amount": 7}"#,
        )
        .unwrap();
        assert_eq!(summary.source, SourceType::Dividend);
    }

    #[test]
    fn test_simple_transaction() {
        let simple = SimpleTransaction::new(
            1,
            currency(),
            PublicKey::new(ISSUER).unwrap(),
            input(None),
            vec![output()],
            "",
        )
        .unwrap();
        assert_eq!(simple.input().index, Some(0));

        let multi = Transaction::new(
            1,
            currency(),
            vec![PublicKey::new(ISSUER).unwrap()],
            vec![input(Some(0)), input(Some(0))],
            vec![output()],
            "",
        )
        .unwrap();
        assert_eq!(
            SimpleTransaction::try_from(multi).unwrap_err(),
            InvariantViolation::NotSimple { issuers: 1, inputs: 2 }
        );
    }
}
