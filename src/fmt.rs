//! Formatting implementation for the SubnetTrie

use std::fmt::{Debug, Formatter, Result};

use crate::prefix::single_bit;
use crate::{Prefix, SubnetTrie};

/// Terminal nodes are written as their prefix, pass-through nodes as `(prefix)`.
impl<P: Prefix> Debug for SubnetTrie<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        DebugSubnetTrie(self, 0, num_traits::Zero::zero()).fmt(f)
    }
}

struct DebugSubnetTrie<'a, P: Prefix>(&'a SubnetTrie<P>, usize, P::R);

struct Label(String, bool);

impl Debug for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.1 {
            f.write_str(&self.0)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

impl<P: Prefix> Debug for DebugSubnetTrie<'_, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let trie = self.0;
        let node = &trie.table[self.1];
        let repr = self.2;
        let label = Label(
            P::from_repr_len(repr, node.depth).canonical(),
            node.terminal,
        );
        let left = node.left.map(|idx| Self(trie, idx, repr));
        let right = node
            .right
            .map(|idx| Self(trie, idx, repr | single_bit(node.depth)));
        match (left, right) {
            (None, None) => label.fmt(f),
            (Some(child), None) | (None, Some(child)) => {
                f.debug_map().entry(&label, &child).finish()
            }
            (Some(left), Some(right)) => f.debug_map().entry(&label, &(left, right)).finish(),
        }
    }
}
