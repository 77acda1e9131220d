//! Inspects a batch of uCoin documents.
//!
//! Usage: `ucoin-doc-inspect <kind> <path> [currency]`
//!
//! `kind` is one of `membership`, `peer`, `tx` or `tx-compact`. Documents in
//! the file are separated by blank lines. Each parsed document is printed as
//! one JSON line; documents that fail to parse are logged and skipped.
//! `currency` is required for `tx-compact`, whose text does not carry it.

use std::fs;
use std::process::ExitCode;

use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use ucoin_doc::{Currency, Membership, ParseError, Peer, Transaction};

const USAGE: &str = "usage: ucoin-doc-inspect <membership|peer|tx|tx-compact> <path> [currency]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Membership,
    Peer,
    Transaction,
    CompactTransaction,
}

impl Kind {
    fn parse(arg: &str) -> Option<Self> {
        match arg {
            "membership" => Some(Kind::Membership),
            "peer" => Some(Kind::Peer),
            "tx" => Some(Kind::Transaction),
            "tx-compact" => Some(Kind::CompactTransaction),
            _ => None,
        }
    }
}

/// One document of the batch and the line it starts on.
#[derive(Debug, PartialEq, Eq)]
struct Chunk {
    first_line: usize,
    text: String,
}

/// Splits a batch on blank lines. Every chunk keeps a trailing newline on
/// each of its lines.
fn split_batch(batch: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut first_line = 1;

    for (i, line) in batch.lines().enumerate() {
        if line.is_empty() {
            if !current.is_empty() {
                chunks.push(Chunk {
                    first_line,
                    text: std::mem::take(&mut current),
                });
            }
            first_line = i + 2;
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.is_empty() {
        chunks.push(Chunk {
            first_line,
            text: current,
        });
    }
    chunks
}

fn to_json<T: Serialize>(result: Result<T, ParseError>) -> Result<String, String> {
    let document = result.map_err(|e| e.to_string())?;
    serde_json::to_string(&document).map_err(|e| e.to_string())
}

fn inspect(kind: Kind, currency: Option<&Currency>, text: &str) -> Result<String, String> {
    match kind {
        Kind::Membership => to_json(Membership::from_signed_raw(text)),
        Kind::Peer => to_json(Peer::from_signed_raw(text)),
        Kind::Transaction => to_json(Transaction::from_signed_raw(text)),
        Kind::CompactTransaction => {
            let currency = currency.ok_or("tx-compact needs a currency argument")?;
            to_json(Transaction::from_compact(currency.clone(), text))
        }
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (kind, path, currency) = match args.as_slice() {
        [kind, path] => (kind, path, None),
        [kind, path, currency] => (kind, path, Some(currency)),
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };
    let Some(kind) = Kind::parse(kind) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    let currency = match currency.map(|c| Currency::new(c.as_str())).transpose() {
        Ok(currency) => currency,
        Err(e) => {
            tracing::error!(error = %e, "invalid currency argument");
            return ExitCode::from(2);
        }
    };

    let batch = match fs::read_to_string(path) {
        Ok(batch) => batch,
        Err(e) => {
            tracing::error!(path = %path, error = %e, "cannot read batch");
            return ExitCode::FAILURE;
        }
    };

    let mut parsed = 0;
    let mut skipped = 0;
    for chunk in split_batch(&batch) {
        match inspect(kind, currency.as_ref(), &chunk.text) {
            Ok(json) => {
                println!("{json}");
                parsed += 1;
            }
            Err(reason) => {
                tracing::warn!(line = chunk.first_line, %reason, "skipping document");
                skipped += 1;
            }
        }
    }

    tracing::info!(parsed, skipped, "batch inspected");
    ExitCode::SUCCESS
}
