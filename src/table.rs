//! Assignment table loading.
//!
//! Reads `<address>/<length> <pop>` lines and builds a [`PopTrie`] from
//! them. Loading stops at the first bad line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info};

use crate::prefix::{parse_entry, PrefixError};
use crate::trie::{PopTrie, TrieError};

/// Errors that can occur while loading the assignment table
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to read routing table: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed entry on line {line_number}: '{line}'")]
    MalformedInput {
        line_number: usize,
        line: String,
        #[source]
        source: PrefixError,
    },

    #[error("line {line_number}: {source}")]
    DuplicatePrefix {
        line_number: usize,
        #[source]
        source: TrieError,
    },
}

/// Lines that carry no entry: blank or `#` comments
pub(crate) fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Load the assignment table at `path`
pub fn load_table(path: &Path) -> Result<PopTrie, TableError> {
    info!("Loading routing table from: {:?}", path);
    let file = File::open(path)?;
    load_table_from_reader(BufReader::new(file))
}

/// Build a trie from table lines supplied by `reader`
pub fn load_table_from_reader<R: BufRead>(reader: R) -> Result<PopTrie, TableError> {
    let mut trie = PopTrie::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        if is_skippable(&line) {
            continue;
        }

        let entry = parse_entry(&line).map_err(|source| TableError::MalformedInput {
            line_number,
            line: line.clone(),
            source,
        })?;
        debug!("Inserting {} => PoP {}", entry.prefix, entry.pop);

        trie.insert(entry.prefix, entry.pop)
            .map_err(|source| TableError::DuplicatePrefix { line_number, source })?;
    }

    info!(
        "Loaded {} prefixes into {} trie nodes",
        trie.len(),
        trie.node_count()
    );
    Ok(trie)
}
