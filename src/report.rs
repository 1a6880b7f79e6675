//! Rendering of lookup results.
//!
//! Text output is one human-readable line per query. JSON output is one
//! object per line so it can be streamed into other tools.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::query::QueryOutcome;

/// Output format for lookup results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// JSON shape of a single lookup
#[derive(Debug, Serialize)]
struct JsonRecord {
    query: String,
    address_hex: String,
    matched: bool,
    pop: Option<u16>,
    prefix_length: Option<u32>,
}

/// Render one outcome in text form
pub fn format_text(outcome: &QueryOutcome) -> String {
    match outcome.result {
        Some(found) => format!(
            "{} => PoP: {}, prefix-length: {}",
            outcome.query, found.pop, found.prefix_length
        ),
        None => format!("{} => no matching entry", outcome.query),
    }
}

/// Render one outcome as a JSON object
pub fn format_json(outcome: &QueryOutcome) -> serde_json::Result<String> {
    let record = JsonRecord {
        query: outcome.query.to_string(),
        address_hex: outcome.query.to_hex(),
        matched: outcome.result.is_some(),
        pop: outcome.result.map(|m| m.pop),
        prefix_length: outcome.result.map(|m| m.prefix_length),
    };
    serde_json::to_string(&record)
}

/// Write a single outcome as one line
pub fn write_outcome<W: Write>(
    out: &mut W,
    outcome: &QueryOutcome,
    format: OutputFormat,
) -> io::Result<()> {
    let line = match format {
        OutputFormat::Text => format_text(outcome),
        OutputFormat::Json => format_json(outcome)?,
    };
    writeln!(out, "{}", line)
}

/// Write every outcome to `out`, one line each
pub fn write_report<W: Write>(
    out: &mut W,
    outcomes: &[QueryOutcome],
    format: OutputFormat,
) -> io::Result<()> {
    for outcome in outcomes {
        write_outcome(out, outcome, format)?;
    }
    out.flush()
}
