//! Serialization formats of a subnet trie.
//!
//! Both formats only store the shape of the tree and which nodes are terminal. Prefixes are
//! implied by the position of a node, and depths are recomputed when decoding.
//!
//! - [`tree`]: one nested JSON object per node, `null` for absent children.
//! - [`flat`]: breadth-first list of node records with child-presence flags, encoded with
//!   `bincode`.

use crate::error::Result;
use crate::inner::Table;

pub mod flat;
pub mod tree;

/// Format used by [`SubnetTrie::serialize`](crate::SubnetTrie::serialize) and
/// [`SubnetTrie::deserialize`](crate::SubnetTrie::deserialize).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Serializer {
    /// Tree-shaped JSON text, see [`tree`].
    Tree,
    /// Flattened breadth-first binary records, see [`flat`].
    Flat,
}

impl Serializer {
    pub(crate) fn encode(self, table: &Table) -> Result<Vec<u8>> {
        match self {
            Serializer::Tree => Ok(tree::encode_table(table)?.into_bytes()),
            Serializer::Flat => flat::encode_table(table),
        }
    }

    pub(crate) fn decode(self, bytes: &[u8], max_depth: u8) -> Result<Option<Table>> {
        match self {
            Serializer::Tree => tree::decode_table(bytes, max_depth),
            Serializer::Flat => flat::decode_table(bytes, max_depth),
        }
    }
}

/// Error for a child that would sit deeper than the address family allows.
pub(crate) fn too_deep(max_depth: u8) -> crate::Error {
    crate::Error::Format(format!("tree is deeper than {max_depth} bits"))
}
