//! Property tests for trie lookups and query resolution.

use crate::prefix::AddressPrefix;
use crate::query::{resolve, resolve_parallel};
use crate::trie::{PopTrie, TrieNode};

use proptest::prelude::*;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

/// Clear the bits past `length` so equal prefixes compare equal
fn canonical(address: u128, length: u8) -> AddressPrefix {
    let mask = if length == 0 { 0 } else { u128::MAX << (128 - u32::from(length)) };
    AddressPrefix::new(address & mask, length).unwrap()
}

fn arb_prefix() -> impl Strategy<Value = AddressPrefix> {
    (any::<u128>(), 0u8..=128).prop_map(|(address, length)| canonical(address, length))
}

/// Short prefixes collide often, which exercises shared paths and fallbacks
fn arb_short_prefix() -> impl Strategy<Value = AddressPrefix> {
    (any::<u128>(), 0u8..=8).prop_map(|(address, length)| canonical(address, length))
}

fn arb_table() -> impl Strategy<Value = BTreeMap<(u128, u8), u16>> {
    prop::collection::vec(
        (prop_oneof![arb_prefix(), arb_short_prefix()], any::<u16>()),
        0..64,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(p, pop)| ((p.address(), p.length()), pop))
            .collect()
    })
}

fn build(entries: &[((u128, u8), u16)]) -> PopTrie {
    let mut trie = PopTrie::new();
    for &((address, length), pop) in entries {
        trie.insert(AddressPrefix::new(address, length).unwrap(), pop).unwrap();
    }
    trie
}

/// Walk `depth` bits of `prefix` and return the node reached
fn node_at(trie: &PopTrie, prefix: AddressPrefix, depth: u32) -> Option<&TrieNode> {
    let mut bits = prefix;
    let mut node = trie.root();
    for _ in 0..depth {
        match bits.pop_bit() {
            Some(bit) => node = node.child(bit)?,
            None => return None,
        }
    }
    Some(node)
}

/// Brute-force longest match over the table, ancestors only.
///
/// The root is never an ancestor candidate; a `::/0` entry is only reached
/// through the descendant fallback.
fn longest_ancestor(table: &BTreeMap<(u128, u8), u16>, query: AddressPrefix) -> Option<(u16, u32)> {
    table
        .iter()
        .filter(|((address, length), _)| {
            *length >= 1
                && *length <= query.length()
                && canonical(query.address(), *length).address() == *address
        })
        .max_by_key(|((_, length), _)| *length)
        .map(|((_, length), pop)| (*pop, u32::from(*length)))
}

proptest! {
    #[test]
    fn exact_match_returns_own_value(table in arb_table()) {
        let entries: Vec<_> = table.iter().map(|(k, v)| (*k, *v)).collect();
        let trie = build(&entries);
        prop_assert_eq!(trie.len(), table.len());

        for (&(address, length), &pop) in &table {
            let found = trie.find(AddressPrefix::new(address, length).unwrap()).unwrap();
            prop_assert_eq!(found.pop, pop);
            prop_assert_eq!(found.prefix_length, u32::from(length));
        }
    }

    #[test]
    fn ancestor_matches_agree_with_brute_force(
        table in arb_table(),
        queries in prop::collection::vec(prop_oneof![arb_prefix(), arb_short_prefix()], 1..32),
    ) {
        let entries: Vec<_> = table.iter().map(|(k, v)| (*k, *v)).collect();
        let trie = build(&entries);

        for query in queries {
            let expected = longest_ancestor(&table, query);
            let found = trie.find(query).map(|m| (m.pop, m.prefix_length));
            match expected {
                Some(hit) => prop_assert_eq!(found, Some(hit)),
                // Anything returned here came from the descendant fallback
                None => {
                    if let Some((_, depth)) = found {
                        prop_assert!(depth >= u32::from(query.length()));
                    }
                }
            }
        }
    }

    #[test]
    fn match_points_at_a_valued_node(
        table in arb_table(),
        query in prop_oneof![arb_prefix(), arb_short_prefix()],
    ) {
        let entries: Vec<_> = table.iter().map(|(k, v)| (*k, *v)).collect();
        let trie = build(&entries);

        if let Some(found) = trie.find(query) {
            prop_assert!(found.prefix_length <= 128);
            if found.prefix_length <= u32::from(query.length()) {
                let node = node_at(&trie, query, found.prefix_length).unwrap();
                prop_assert_eq!(node.pop(), Some(found.pop));
            }
        }
    }

    #[test]
    fn insertion_order_does_not_matter(table in arb_table(), seed in any::<u64>()) {
        use rand::SeedableRng;

        let entries: Vec<_> = table.iter().map(|(k, v)| (*k, *v)).collect();
        let mut shuffled = entries.clone();
        shuffled.shuffle(&mut rand::rngs::StdRng::seed_from_u64(seed));

        let a = build(&entries);
        let b = build(&shuffled);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.node_count(), b.node_count());
    }

    #[test]
    fn duplicates_always_rejected(prefix in arb_prefix(), first in any::<u16>(), second in any::<u16>()) {
        let mut trie = PopTrie::new();
        trie.insert(prefix, first).unwrap();
        prop_assert!(trie.insert(prefix, second).is_err());
        prop_assert_eq!(trie.find(prefix).map(|m| m.pop), Some(first));
    }

    #[test]
    fn parallel_resolution_matches_sequential(
        table in arb_table(),
        queries in prop::collection::vec(prop_oneof![arb_prefix(), arb_short_prefix()], 0..64),
    ) {
        let entries: Vec<_> = table.iter().map(|(k, v)| (*k, *v)).collect();
        let trie = build(&entries);
        prop_assert_eq!(resolve_parallel(&trie, &queries), resolve(&trie, &queries));
    }
}
