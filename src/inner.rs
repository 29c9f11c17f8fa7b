//! The node table of a subnet trie.

use std::ops::{Index, IndexMut};

/// A single node of the binary trie. Children are indices into the owning [`Table`]. Slot 0
/// (`left`) is taken when the next bit is not set, slot 1 (`right`) otherwise.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) terminal: bool,
    pub(crate) depth: u8,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
}

impl Node {
    pub(crate) fn new(depth: u8) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    /// Get the child in slot `right`.
    #[inline(always)]
    pub(crate) fn child(&self, right: bool) -> Option<usize> {
        if right {
            self.right
        } else {
            self.left
        }
    }

    /// All present children in slot order, together with their slot.
    #[inline(always)]
    pub(crate) fn children(&self) -> impl Iterator<Item = (bool, usize)> {
        [(false, self.left), (true, self.right)]
            .into_iter()
            .filter_map(|(right, child)| child.map(|c| (right, c)))
    }

    /// A node that is neither terminal nor has any children does not carry information.
    #[inline(always)]
    pub(crate) fn is_garbage(&self) -> bool {
        !self.terminal && self.left.is_none() && self.right.is_none()
    }
}

/// Table of all nodes of a trie. Index 0 is always the root. Slots of removed nodes are kept in a
/// free list and reused by the next insert.
#[derive(Clone, Debug)]
pub(crate) struct Table {
    nodes: Vec<Node>,
    free: Vec<usize>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            nodes: vec![Node::new(0)],
            free: Vec::new(),
        }
    }
}

impl Index<usize> for Table {
    type Output = Node;

    fn index(&self, index: usize) -> &Self::Output {
        &self.nodes[index]
    }
}

impl IndexMut<usize> for Table {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.nodes[index]
    }
}

impl Table {
    /// Build a table directly from its nodes. The caller must guarantee that `nodes` is a
    /// non-empty tree rooted at index 0 in which every node is referenced at most once.
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        debug_assert!(!nodes.is_empty(), "a table always has a root");
        Self {
            nodes,
            free: Vec::new(),
        }
    }

    /// Number of nodes that are reachable from the root.
    pub(crate) fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Get the child of a node, either to the left or the right
    #[inline(always)]
    pub(crate) fn get_child(&self, idx: usize, right: bool) -> Option<usize> {
        self[idx].child(right)
    }

    /// set the child of a node (either to the left or the right), and return the index of the old
    /// child.
    #[inline(always)]
    pub(crate) fn set_child(&mut self, idx: usize, child: usize, right: bool) -> Option<usize> {
        if right {
            self[idx].right.replace(child)
        } else {
            self[idx].left.replace(child)
        }
    }

    /// remove a child from a node (just the reference).
    #[inline(always)]
    pub(crate) fn clear_child(&mut self, idx: usize, right: bool) -> Option<usize> {
        if right {
            self[idx].right.take()
        } else {
            self[idx].left.take()
        }
    }

    /// insert a new node into the table and return its index.
    #[inline(always)]
    pub(crate) fn new_node(&mut self, depth: u8) -> usize {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = Node::new(depth);
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(Node::new(depth));
            idx
        }
    }

    /// Detach the child of `idx` at slot `right` and release its slot. The child must not have
    /// any children itself.
    pub(crate) fn free_child(&mut self, idx: usize, right: bool) {
        if let Some(child) = self.clear_child(idx, right) {
            debug_assert!(self[child].left.is_none() && self[child].right.is_none());
            self.nodes[child] = Node::default();
            self.free.push(child);
        }
    }

    /// Get the directions from some node `cur` (sitting at depth `cur.depth`) to get to the node
    /// of `prefix`.
    #[inline(always)]
    pub(crate) fn get_direction<P: crate::Prefix>(&self, cur: usize, prefix: &P) -> Direction {
        let depth = self[cur].depth;
        if depth >= prefix.prefix_len() {
            Direction::Reached
        } else {
            let right = prefix.is_bit_set(depth);
            match self.get_child(cur, right) {
                Some(next) => Direction::Enter { next, right },
                None => Direction::Missing { right },
            }
        }
    }
}

pub(crate) enum Direction {
    /// The prefix is already reached.
    Reached,
    /// Enter the next index and search again.
    Enter { next: usize, right: bool },
    /// The child that would lead to the prefix does not exist.
    Missing { right: bool },
}
