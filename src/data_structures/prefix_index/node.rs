// Copyright (c) 2025 Roster Authors
//
// Licensed under the MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)

//! Node implementation for the prefix index.
//!
//! Nodes are the building blocks of the index. Each node owns its children
//! by value, so detaching an edge from the parent drops the whole subtree.

use std::collections::BTreeMap;

/// A node in the prefix index.
///
/// Each node represents one character of an identifier path. Terminal nodes
/// mark the end of a stored identifier.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct TrieNode {
    /// Children keyed by the next character, iterated in ascending order
    pub(crate) children: BTreeMap<char, TrieNode>,

    /// Whether the path to this node spells a stored identifier
    pub(crate) is_terminal: bool,
}

impl TrieNode {
    /// Creates a new empty trie node.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A node is prunable when it neither terminates an identifier nor
    /// leads to one.
    pub(crate) fn is_prunable(&self) -> bool {
        !self.is_terminal && self.children.is_empty()
    }

    /// Number of nodes in the subtree rooted here, this node included.
    pub(crate) fn subtree_size(&self) -> usize {
        1 + self
            .children
            .values()
            .map(TrieNode::subtree_size)
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_node_is_prunable() {
        let node = TrieNode::new();
        assert!(node.is_prunable());
        assert_eq!(node.subtree_size(), 1);
    }

    #[test]
    fn test_terminal_or_parent_node_is_kept() {
        let mut node = TrieNode::new();
        node.is_terminal = true;
        assert!(!node.is_prunable());

        let mut parent = TrieNode::new();
        parent.children.insert('a', node);
        assert!(!parent.is_prunable());
        assert_eq!(parent.subtree_size(), 2);
    }
}
