//! Flattened encoding.
//!
//! The tree is traversed breadth-first from the root, producing one [`FlatNode`] per node. The
//! records do not reference each other: while decoding, a queue replays the same traversal, and
//! every dequeued record claims the next unclaimed records as its children (slot 0 first). An empty
//! record list encodes a trie without root.
//!
//! The record list is written with `bincode`: a `u64` length followed by three bytes per record.
//!
//! ```
//! # use ip_subnet_trie::*;
//! # use ip_subnet_trie::codec::flat::{records, FlatNode};
//! # fn main() -> Result<()> {
//! let mut trie = Ipv4SubnetTrie::new();
//! trie.insert("128.0.0.0/1")?;
//! trie.insert("0.0.0.0/1")?;
//! let node = |is_end, has_zero_child, has_one_child| FlatNode {
//!     is_end,
//!     has_zero_child,
//!     has_one_child,
//! };
//! assert_eq!(
//!     records(&trie),
//!     vec![node(false, true, true), node(true, false, false), node(true, false, false)]
//! );
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::inner::{Node, Table};
use crate::{Prefix, SubnetTrie};

/// A single node in breadth-first order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlatNode {
    /// Whether a stored prefix ends at this node.
    pub is_end: bool,
    /// Whether the node has a child in slot 0.
    pub has_zero_child: bool,
    /// Whether the node has a child in slot 1.
    pub has_one_child: bool,
}

/// The breadth-first records of a trie.
pub fn records<P: Prefix>(trie: &SubnetTrie<P>) -> Vec<FlatNode> {
    table_records(&trie.table)
}

/// Rebuild a trie from its breadth-first records. Returns `None` for an empty list.
pub fn from_records<P: Prefix>(records: &[FlatNode]) -> Result<Option<SubnetTrie<P>>> {
    Ok(records_table(records, P::max_len())?.map(SubnetTrie::from_table))
}

/// Encode a trie into bytes.
pub fn encode<P: Prefix>(trie: &SubnetTrie<P>) -> Result<Vec<u8>> {
    encode_table(&trie.table)
}

/// Decode a trie from bytes. Returns `None` for an empty record list.
pub fn decode<P: Prefix>(bytes: &[u8]) -> Result<Option<SubnetTrie<P>>> {
    Ok(decode_table(bytes, P::max_len())?.map(SubnetTrie::from_table))
}

pub(crate) fn encode_table(table: &Table) -> Result<Vec<u8>> {
    Ok(bincode::serialize(&table_records(table))?)
}

pub(crate) fn decode_table(bytes: &[u8], max_depth: u8) -> Result<Option<Table>> {
    let records: Vec<FlatNode> = bincode::deserialize(bytes)?;
    records_table(&records, max_depth)
}

fn table_records(table: &Table) -> Vec<FlatNode> {
    let mut result = Vec::new();
    let mut queue = VecDeque::from([0]);
    while let Some(idx) = queue.pop_front() {
        let node = &table[idx];
        result.push(FlatNode {
            is_end: node.terminal,
            has_zero_child: node.left.is_some(),
            has_one_child: node.right.is_some(),
        });
        queue.extend(node.children().map(|(_, child)| child));
    }
    result
}

fn records_table(records: &[FlatNode], max_depth: u8) -> Result<Option<Table>> {
    if records.is_empty() {
        return Ok(None);
    }
    let claimed: usize = records
        .iter()
        .map(|r| r.has_zero_child as usize + r.has_one_child as usize)
        .sum();
    if claimed + 1 != records.len() {
        return Err(Error::Format(format!(
            "{} records, but the child flags describe {} nodes",
            records.len(),
            claimed + 1
        )));
    }

    // the queue hands out indices in the same order as the encoder visited the nodes, so node `i`
    // is always described by `records[i]`.
    let mut nodes = Vec::with_capacity(records.len());
    nodes.push(Node::new(0));
    let mut queue = VecDeque::from([0]);
    while let Some(idx) = queue.pop_front() {
        let record = records[idx];
        nodes[idx].terminal = record.is_end;
        let depth = nodes[idx].depth;
        for (right, present) in [
            (false, record.has_zero_child),
            (true, record.has_one_child),
        ] {
            if !present {
                continue;
            }
            if depth >= max_depth {
                return Err(super::too_deep(max_depth));
            }
            let child = nodes.len();
            nodes.push(Node::new(depth + 1));
            if right {
                nodes[idx].right = Some(child);
            } else {
                nodes[idx].left = Some(child);
            }
            queue.push_back(child);
        }
    }

    if nodes.len() != records.len() {
        return Err(Error::Format(format!(
            "{} of {} records are not reachable from the root",
            records.len() - nodes.len(),
            records.len()
        )));
    }
    Ok(Some(Table::from_nodes(nodes)))
}
