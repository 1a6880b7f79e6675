//! # Popmatch - PoP lookup for IPv6 prefixes
//!
//! This library maps IPv6 address prefixes to the operator point-of-presence
//! (PoP) that serves them, using longest-prefix match over a table of
//! `prefix -> PoP` assignments.
//!
//! ## Overview
//!
//! The assignment table is loaded once into a binary trie, one level per
//! address bit. Queries are then matched read-only against it:
//!
//! - The deepest assignment on the query's bit-path below the root wins.
//! - If the query's bits run out on a node with no assignment above or at it,
//!   the leftmost (0-preferring) assignment below that node is returned.
//! - Otherwise the query has no match.
//!
//! ## Architecture
//!
//! - `prefix`: 128-bit address prefixes, bit consumption and text parsing
//! - `trie`: the prefix trie and the lookup algorithm
//! - `table`: assignment table loading
//! - `query`: query parsing and (parallel) resolution
//! - `report`: text and JSON rendering of results
//! - `config`: YAML configuration with CLI overrides
//!
//! ## Example Usage
//!
//! ```rust
//! use popmatch::{AddressPrefix, PopTrie};
//!
//! let mut trie = PopTrie::new();
//! trie.insert("2001:db8::/32".parse()?, 7)?;
//! trie.insert("2001:db8:1::/48".parse()?, 9)?;
//!
//! let query: AddressPrefix = "2001:db8:1::1/128".parse()?;
//! let found = trie.find(query).expect("covered by the /48");
//! assert_eq!((found.pop, found.prefix_length), (9, 48));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Table Format
//!
//! One assignment per line, blank lines and `#` comments ignored:
//!
//! ```text
//! 2001:db8::/32 7
//! 2001:db8:1::/48 9
//! ```
//!
//! ## Error Handling
//!
//! Each module exposes a `thiserror` error enum. Duplicate prefixes and
//! malformed lines are fatal: loading stops at the first one and the binary
//! exits non-zero with a `color_eyre` report.

pub mod config;
pub mod prefix;
pub mod query;
pub mod report;
pub mod table;
pub mod trie;

#[cfg(test)]
mod proptests;

pub use prefix::{AddressPrefix, PrefixError, RouteEntry};
pub use trie::{MatchResult, PopTrie, TrieError};
