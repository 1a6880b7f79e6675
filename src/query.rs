//! Query parsing and resolution against a loaded trie.
//!
//! Queries are answered as they are read: the sequential path writes and
//! flushes one result line per input line, the parallel path does the same
//! per bounded chunk. A malformed line stops processing, but every answer
//! for the lines before it has already been written.

use std::io::{BufRead, Write};

use log::debug;
use rayon::prelude::*;

use crate::prefix::{AddressPrefix, PrefixError};
use crate::report::{write_outcome, OutputFormat};
use crate::table::is_skippable;
use crate::trie::{MatchResult, PopTrie};

/// Queries buffered per batch by [`stream_queries_parallel`]
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Errors that can occur while reading queries or writing their answers
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("query I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed query on line {line_number}: '{line}'")]
    MalformedInput {
        line_number: usize,
        line: String,
        #[source]
        source: PrefixError,
    },
}

/// A query together with what it resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOutcome {
    pub query: AddressPrefix,
    pub result: Option<MatchResult>,
}

/// Counts reported once a query stream is exhausted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub queries: usize,
    pub matched: usize,
}

impl StreamSummary {
    fn record(&mut self, outcome: &QueryOutcome) {
        self.queries += 1;
        if outcome.result.is_some() {
            self.matched += 1;
        }
    }
}

/// Parse one input line; `None` for blanks and `#` comments
fn parse_query_line(line_number: usize, line: &str) -> Result<Option<AddressPrefix>, QueryError> {
    if is_skippable(line) {
        return Ok(None);
    }
    line.parse()
        .map(Some)
        .map_err(|source| QueryError::MalformedInput {
            line_number,
            line: line.to_string(),
            source,
        })
}

/// Parse `<address>/<length>` lines, skipping blanks and `#` comments.
pub fn parse_queries<R: BufRead>(reader: R) -> Result<Vec<AddressPrefix>, QueryError> {
    let mut queries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        if let Some(query) = parse_query_line(index + 1, &line?)? {
            queries.push(query);
        }
    }
    debug!("Parsed {} queries", queries.len());
    Ok(queries)
}

/// Resolve every query in order on the current thread
pub fn resolve(trie: &PopTrie, queries: &[AddressPrefix]) -> Vec<QueryOutcome> {
    queries
        .iter()
        .map(|&query| QueryOutcome { query, result: trie.find(query) })
        .collect()
}

/// Resolve queries on the rayon pool. Output order matches input order.
pub fn resolve_parallel(trie: &PopTrie, queries: &[AddressPrefix]) -> Vec<QueryOutcome> {
    queries
        .par_iter()
        .map(|&query| QueryOutcome { query, result: trie.find(query) })
        .collect()
}

/// Answer each query line as soon as it is read.
///
/// Every result line is flushed before the next input line is read, so an
/// interactive producer sees its answer without closing the stream.
pub fn stream_queries<R: BufRead, W: Write>(
    trie: &PopTrie,
    reader: R,
    out: &mut W,
    format: OutputFormat,
) -> Result<StreamSummary, QueryError> {
    let mut summary = StreamSummary::default();
    for (index, line) in reader.lines().enumerate() {
        let Some(query) = parse_query_line(index + 1, &line?)? else {
            continue;
        };
        let outcome = QueryOutcome { query, result: trie.find(query) };
        write_outcome(out, &outcome, format)?;
        out.flush()?;
        summary.record(&outcome);
    }
    Ok(summary)
}

/// Answer queries in chunks of at most `chunk_size`, each chunk resolved on
/// the rayon pool and flushed before the next one is read.
///
/// A malformed line still gets the answers for the lines before it written
/// out before the error is returned.
pub fn stream_queries_parallel<R: BufRead, W: Write>(
    trie: &PopTrie,
    reader: R,
    out: &mut W,
    format: OutputFormat,
    chunk_size: usize,
) -> Result<StreamSummary, QueryError> {
    let chunk_size = chunk_size.max(1);
    let mut summary = StreamSummary::default();
    let mut pending = Vec::with_capacity(chunk_size);

    for (index, line) in reader.lines().enumerate() {
        let parsed = line
            .map_err(QueryError::from)
            .and_then(|line| parse_query_line(index + 1, &line));
        match parsed {
            Ok(Some(query)) => {
                pending.push(query);
                if pending.len() >= chunk_size {
                    answer_chunk(trie, &mut pending, out, format, &mut summary)?;
                }
            }
            Ok(None) => {}
            Err(err) => {
                answer_chunk(trie, &mut pending, out, format, &mut summary)?;
                return Err(err);
            }
        }
    }
    answer_chunk(trie, &mut pending, out, format, &mut summary)?;

    Ok(summary)
}

fn answer_chunk<W: Write>(
    trie: &PopTrie,
    pending: &mut Vec<AddressPrefix>,
    out: &mut W,
    format: OutputFormat,
    summary: &mut StreamSummary,
) -> Result<(), QueryError> {
    if pending.is_empty() {
        return Ok(());
    }
    for outcome in resolve_parallel(trie, pending) {
        write_outcome(out, &outcome, format)?;
        summary.record(&outcome);
    }
    out.flush()?;
    debug!("Answered chunk of {} queries", pending.len());
    pending.clear();
    Ok(())
}
