//! Sentinel-linked ordered set
//!
//! Entries live in an arena and point at each other through explicit
//! `prev`/`next` indices. Index 0 is the sentinel: its `next` is the head of
//! the list and its `prev` is the tail, so an empty set is a sentinel that
//! points at itself.

use std::collections::HashMap;
use std::hash::Hash;

const SENTINEL_INDEX: usize = 0;

/// Successor of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Link<K> {
    /// End of the list
    Sentinel,
    /// Another entry
    Key(K),
}

impl<K> Link<K> {
    /// Check if this link marks the end of the list
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Link::Sentinel)
    }
}

#[derive(Debug, Clone)]
struct Node<K> {
    /// `None` only for the sentinel
    key: Option<K>,
    prev: usize,
    next: usize,
}

/// Ordered set with sentinel-terminated links
#[derive(Debug, Clone)]
pub struct LinkedSet<K> {
    nodes: Vec<Node<K>>,
    index: HashMap<K, usize>,
}

impl<K: Copy + Eq + Hash> LinkedSet<K> {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                key: None,
                prev: SENTINEL_INDEX,
                next: SENTINEL_INDEX,
            }],
            index: HashMap::new(),
        }
    }

    /// Link `key` immediately before `next`
    ///
    /// `Link::Sentinel` appends at the tail.
    pub fn insert_before(&mut self, key: K, next: Link<K>) -> Result<(), LinkedSetError> {
        if self.index.contains_key(&key) {
            return Err(LinkedSetError::Duplicate);
        }

        let next_idx = match next {
            Link::Sentinel => SENTINEL_INDEX,
            Link::Key(k) => *self.index.get(&k).ok_or(LinkedSetError::UnknownSuccessor)?,
        };
        let prev_idx = self.nodes[next_idx].prev;
        let new_idx = self.nodes.len();

        self.nodes.push(Node {
            key: Some(key),
            prev: prev_idx,
            next: next_idx,
        });
        self.nodes[prev_idx].next = new_idx;
        self.nodes[next_idx].prev = new_idx;
        self.index.insert(key, new_idx);

        Ok(())
    }

    /// Append `key` at the tail
    pub fn push_back(&mut self, key: K) -> Result<(), LinkedSetError> {
        self.insert_before(key, Link::Sentinel)
    }

    /// Successor of `key`, `None` if `key` is not in the set
    pub fn next_of(&self, key: &K) -> Option<Link<K>> {
        self.index
            .get(key)
            .map(|&idx| self.link_at(self.nodes[idx].next))
    }

    /// First entry, or the sentinel when empty
    pub fn head(&self) -> Link<K> {
        self.link_at(self.nodes[SENTINEL_INDEX].next)
    }

    /// Check membership
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Number of entries (sentinel excluded)
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the set has no entries
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Walk the list from the sentinel head
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            set: self,
            cursor: self.nodes[SENTINEL_INDEX].next,
        }
    }

    fn link_at(&self, idx: usize) -> Link<K> {
        self.nodes[idx].key.map_or(Link::Sentinel, Link::Key)
    }
}

impl<K: Copy + Eq + Hash> Default for LinkedSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a [`LinkedSet`] in list order
pub struct Iter<'a, K> {
    set: &'a LinkedSet<K>,
    cursor: usize,
}

impl<'a, K: Copy> Iterator for Iter<'a, K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        if self.cursor == SENTINEL_INDEX {
            return None;
        }
        let node = &self.set.nodes[self.cursor];
        self.cursor = node.next;
        node.key
    }
}

/// Linked set errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkedSetError {
    #[error("Entry already linked")]
    Duplicate,

    #[error("Successor is not linked")]
    UnknownSuccessor,
}
