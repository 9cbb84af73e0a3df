//! The current node set.

use std::collections::HashSet;
use std::hash::Hash;

/// Ordered, de-duplicated node handles.
///
/// Nodes keep the order in which they were first collected, so execution and
/// failure messages do not depend on hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<N> {
    nodes: Vec<N>,
}

impl<N: Copy + Eq + Hash> Cursor<N> {
    pub fn empty() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn single(node: N) -> Self {
        Self { nodes: vec![node] }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = N> + '_ {
        self.nodes.iter().copied()
    }
}

impl<N: Copy + Eq + Hash> Default for Cursor<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<N: Copy + Eq + Hash> FromIterator<N> for Cursor<N> {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let nodes = iter.into_iter().filter(|node| seen.insert(*node)).collect();
        Self { nodes }
    }
}
