//! Binary trie mapping address prefixes to PoP identifiers.
//!
//! The trie is filled once with [`PopTrie::insert`] and then queried with
//! [`PopTrie::find`]. Each level of the tree consumes one address bit, so a
//! prefix of length `n` is owned by the node at depth `n`.

use crate::prefix::AddressPrefix;

/// Errors raised while building the trie
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrieError {
    #[error("duplicate prefix: {prefix}")]
    DuplicatePrefix { prefix: AddressPrefix },
}

/// Result of a successful lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub pop: u16,
    /// Trie depth of the node that supplied `pop`
    pub prefix_length: u32,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TrieNode {
    pop: Option<u16>,
    children: [Option<Box<TrieNode>>; 2],
}

impl TrieNode {
    pub fn pop(&self) -> Option<u16> {
        self.pop
    }

    pub fn child(&self, bit: usize) -> Option<&TrieNode> {
        self.children[bit].as_deref()
    }
}

/// Insert-once, query-many prefix table
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PopTrie {
    root: TrieNode,
    entries: usize,
}

impl PopTrie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &TrieNode {
        &self.root
    }

    /// Number of prefixes stored
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Number of nodes in the tree, root included
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter().flatten().map(|child| &**child));
        }
        count
    }

    /// Attach `pop` to the node owning `prefix`, creating the path to it.
    ///
    /// Fails if that node already carries a value; existing assignments are
    /// never overwritten.
    pub fn insert(&mut self, prefix: AddressPrefix, pop: u16) -> Result<(), TrieError> {
        let mut bits = prefix;
        let mut current = &mut self.root;
        while let Some(bit) = bits.pop_bit() {
            current = &mut **current.children[bit].get_or_insert_with(Box::default);
        }

        if current.pop.is_some() {
            return Err(TrieError::DuplicatePrefix { prefix });
        }
        current.pop = Some(pop);
        self.entries += 1;
        Ok(())
    }

    /// Longest-prefix match for `prefix`.
    ///
    /// The deepest valued node on the query's bit-path wins. If the path is
    /// fully walked without meeting any value, the search continues below the
    /// last node reached, always preferring the 0 child, and returns the
    /// first value found there. Returns `None` if neither step finds a value.
    pub fn find(&self, prefix: AddressPrefix) -> Option<MatchResult> {
        let mut bits = prefix;
        let mut best = None;
        let mut depth = 0u32;
        let mut current = Some(&self.root);

        while let Some(node) = current {
            let Some(bit) = bits.pop_bit() else { break };
            depth += 1;
            current = node.child(bit);
            if let Some(pop) = current.and_then(TrieNode::pop) {
                best = Some(MatchResult { pop, prefix_length: depth });
            }
        }

        if best.is_some() {
            return best;
        }

        // Leftmost descendant below the point where the query ran out
        while let Some(node) = current {
            if let Some(pop) = node.pop {
                return Some(MatchResult { pop, prefix_length: depth });
            }
            depth += 1;
            current = node.child(0).or_else(|| node.child(1));
        }

        None
    }
}
