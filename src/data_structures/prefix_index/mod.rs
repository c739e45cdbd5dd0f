// Copyright (c) 2025 Roster Authors
//
// Licensed under the MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)

//! Prefix Index Implementation
//!
//! This module provides a prefix tree (trie) over record identifiers. It
//! answers exact membership, prefix existence and autocomplete queries.
//!
//! Every operation is total: empty input, unknown identifiers and missing
//! prefixes produce `false` or an empty result, never an error.
//!
//! Enumeration order is deterministic. Children are kept in a `BTreeMap`, so
//! a traversal visits siblings in ascending `char` order and emits a node
//! before its descendants. The identifiers returned for a prefix are
//! therefore sorted by code point.

mod node;

use node::TrieNode;

/// Outcome of one level of the recursive delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Removal {
    /// The identifier is not stored; nothing was touched.
    NotFound,
    /// The identifier was removed. `prune` tells the parent to detach this node.
    Removed { prune: bool },
}

/// A prefix tree over identifier strings.
///
/// Key features:
/// * Exact lookup and prefix existence in O(length of the key)
/// * Autocomplete enumeration of all identifiers sharing a prefix
/// * Deletion that prunes nodes no longer leading to any identifier
///
/// The index owns all of its nodes. Callers only ever receive owned strings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PrefixIndex {
    /// The root node, standing for the empty prefix
    root: TrieNode,

    /// Number of stored identifiers
    len: usize,
}

impl PrefixIndex {
    /// Creates a new empty `PrefixIndex`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an identifier into the index.
    ///
    /// Empty identifiers are ignored. Inserting an identifier that is already
    /// stored leaves the tree unchanged.
    ///
    /// # Returns
    ///
    /// `true` if the identifier was newly added, `false` otherwise.
    pub fn insert(&mut self, identifier: &str) -> bool {
        if identifier.is_empty() {
            return false;
        }

        let mut node = &mut self.root;
        for c in identifier.chars() {
            node = node.children.entry(c).or_default();
        }

        if node.is_terminal {
            return false;
        }
        node.is_terminal = true;
        self.len += 1;
        true
    }

    /// Returns `true` if exactly this identifier is stored.
    pub fn search(&self, identifier: &str) -> bool {
        if identifier.is_empty() {
            return false;
        }
        self.find_node(identifier)
            .map_or(false, |node| node.is_terminal)
    }

    /// Returns `true` if at least one stored identifier begins with `prefix`.
    ///
    /// A prefix equal to a stored identifier counts. The empty prefix always
    /// yields `false`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        if prefix.is_empty() {
            return false;
        }
        self.find_node(prefix).is_some()
    }

    /// Collects every stored identifier that begins with `prefix`.
    ///
    /// The result includes `prefix` itself when it is stored. An empty prefix
    /// or one with no matching path gives an empty vector.
    pub fn enumerate_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut results = Vec::new();
        if prefix.is_empty() {
            return results;
        }

        if let Some(node) = self.find_node(prefix) {
            let mut path = String::from(prefix);
            Self::collect(node, &mut path, &mut results);
        }
        results
    }

    /// Every stored identifier, in enumeration order.
    pub fn identifiers(&self) -> Vec<String> {
        let mut results = Vec::with_capacity(self.len);
        let mut path = String::new();
        Self::collect(&self.root, &mut path, &mut results);
        results
    }

    /// Removes an identifier from the index.
    ///
    /// Nodes left without children and not terminating another identifier
    /// are detached on the way back up. An identifier that is not stored
    /// leaves the tree untouched.
    ///
    /// # Returns
    ///
    /// `true` if the identifier was present and removed, `false` otherwise.
    pub fn delete(&mut self, identifier: &str) -> bool {
        if identifier.is_empty() {
            return false;
        }

        let chars: Vec<char> = identifier.chars().collect();
        match Self::remove_recursive(&mut self.root, &chars) {
            Removal::NotFound => false,
            Removal::Removed { .. } => {
                self.len -= 1;
                true
            }
        }
    }

    /// Number of stored identifiers.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no identifier is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes in the tree, the root included.
    ///
    /// An empty index has exactly one node.
    pub fn node_count(&self) -> usize {
        self.root.subtree_size()
    }

    /// Removes every identifier.
    pub fn clear(&mut self) {
        self.root = TrieNode::new();
        self.len = 0;
    }

    fn find_node(&self, key: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for c in key.chars() {
            node = node.children.get(&c)?;
        }
        Some(node)
    }

    /// Depth-first walk appending to `path` on the way down and popping on
    /// the way back, so a single buffer serves the whole traversal.
    fn collect(node: &TrieNode, path: &mut String, results: &mut Vec<String>) {
        if node.is_terminal {
            results.push(path.clone());
        }
        for (c, child) in &node.children {
            path.push(*c);
            Self::collect(child, path, results);
            path.pop();
        }
    }

    fn remove_recursive(node: &mut TrieNode, chars: &[char]) -> Removal {
        let Some((c, rest)) = chars.split_first() else {
            if !node.is_terminal {
                return Removal::NotFound;
            }
            node.is_terminal = false;
            return Removal::Removed {
                prune: node.children.is_empty(),
            };
        };

        let Some(child) = node.children.get_mut(c) else {
            return Removal::NotFound;
        };

        match Self::remove_recursive(child, rest) {
            Removal::Removed { prune: true } => {
                node.children.remove(c);
                Removal::Removed {
                    prune: node.is_prunable(),
                }
            }
            outcome => outcome,
        }
    }
}

impl<S: AsRef<str>> Extend<S> for PrefixIndex {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for identifier in iter {
            self.insert(identifier.as_ref());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for PrefixIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}
