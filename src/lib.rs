//! This crate provides a binary trie for IP subnets. Each level of the tree consumes exactly one
//! bit of the address, so a prefix of length `n` lives at depth `n` on the path spelled by its
//! first `n` bits. It supports IPv4 and IPv6 through the prefixes of
//! [ipnet](https://docs.rs/ipnet), and any other address family that implements [`Prefix`].
//!
//! ```
//! # use ip_subnet_trie::*;
//! # fn main() -> Result<()> {
//! let mut trie = Ipv4SubnetTrie::new();
//! for ip in ["192.168.0.1", "192.168.0.2", "192.168.0.6", "192.168.0.5"] {
//!     trie.insert(ip)?;
//! }
//! assert_eq!(trie.search("192.168.0.0/24")?, None);
//! trie.insert("192.168.0.0/24")?;
//! assert_eq!(trie.search("192.168.0.0/24")?.as_deref(), Some("192.168.0.0/24"));
//! assert_eq!(trie.get_children("192.168.0.0/24")?.len(), 4);
//! assert_eq!(trie.get_parent("192.168.0.6")?.as_deref(), Some("192.168.0.0/24"));
//! # Ok(())
//! # }
//! ```
//!
//! # Description of the Tree
//!
//! Every node stores whether a prefix ends there (it is *terminal*) and up to two children. To go
//! from a node at depth `d` towards a prefix, we look at bit `d` of the prefix (counted from the
//! left): if it is not set, we take slot 0 (left), and otherwise slot 1 (right). Nodes are created
//! on the way down by inserts. Deletes remove the terminal mark and then prune every node on the
//! path that is neither terminal nor has children, from the bottom up.
//!
//! The nodes live in a table owned by the trie. Each node is referenced by exactly one parent,
//! and slots of pruned nodes are reused by later inserts.
//!
//! # Operations on the tree
//!
//! Every query is a single walk from the root, bounded by the width of the address (32 or 128
//! levels). Results are rebuilt from the bits of that walk and formatted with
//! [`Prefix::canonical`].
//!
//! | Operation                                   | Complexity   |
//! |---------------------------------------------|--------------|
//! | `insert`, `search`, `get_parent`, `delete`  | `O(w)`       |
//! | `get_children`                              | `O(w + m)`   |
//! | `serialize`, `deserialize`                  | `O(m)`       |
//! | `len` and `is_empty`                        | `O(1)`       |
//!
//! where `w` is the address width and `m` the number of nodes below the start point.
//!
//! # Serialization
//!
//! The [`codec`] module offers two encodings that only store the shape of the tree: a nested JSON
//! encoding ([`codec::tree`]) and a breadth-first list of flagged records ([`codec::flat`]). A
//! trie may carry a [`Serializer`] to select one of them for [`SubnetTrie::serialize`] and
//! [`SubnetTrie::deserialize`].
//!
//! The trie is not synchronized. Mutation requires `&mut self`; wrap it in a lock to share it.

#![deny(missing_docs)]

mod error;
mod fmt;
mod inner;
mod prefix;
#[cfg(test)]
mod fuzzing;

pub mod codec;
pub mod trie;

pub use codec::Serializer;
pub use error::{Error, Result};
pub use prefix::Prefix;
pub use trie::{Ipv4SubnetTrie, Ipv6SubnetTrie, SubnetTrie};
