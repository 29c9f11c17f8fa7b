//! Module that contains the implementation for the iterators

use num_traits::Zero;

use crate::inner::Table;
use crate::prefix::single_bit;
use crate::Prefix;

use super::SubnetTrie;

/// An iterator over stored prefixes of a [`SubnetTrie`] in lexicographic order. Each prefix is
/// rebuilt from the path that leads to its node.
pub struct Iter<'a, P: Prefix> {
    table: &'a Table,
    nodes: Vec<(usize, P::R)>,
}

impl<'a, P: Prefix> Iter<'a, P> {
    /// Iterate over the whole tree, the root included.
    pub(crate) fn new(table: &'a Table) -> Self {
        Self {
            table,
            nodes: vec![(0, P::R::zero())],
        }
    }

    /// Iterate over everything below `idx`, but not `idx` itself. `repr` is the path to `idx`.
    pub(crate) fn below(table: &'a Table, idx: usize, repr: P::R) -> Self {
        let mut iter = Self {
            table,
            nodes: Vec::new(),
        };
        iter.push_children(idx, repr);
        iter
    }

    pub(crate) fn empty(table: &'a Table) -> Self {
        Self {
            table,
            nodes: Vec::new(),
        }
    }

    /// Push the children such that the `0` branch is popped first.
    fn push_children(&mut self, idx: usize, repr: P::R) {
        let node = &self.table[idx];
        if let Some(right) = node.right {
            self.nodes.push((right, repr | single_bit(node.depth)));
        }
        if let Some(left) = node.left {
            self.nodes.push((left, repr));
        }
    }
}

impl<P: Prefix> Iterator for Iter<'_, P> {
    type Item = P;

    fn next(&mut self) -> Option<P> {
        while let Some((cur, repr)) = self.nodes.pop() {
            self.push_children(cur, repr);
            let node = &self.table[cur];
            if node.terminal {
                return Some(P::from_repr_len(repr, node.depth));
            }
        }
        None
    }
}

impl<'a, P: Prefix> IntoIterator for &'a SubnetTrie<P> {
    type Item = P;

    type IntoIter = Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
