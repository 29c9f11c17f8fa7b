//! Implementation of the subnet trie.

use std::collections::HashSet;
use std::marker::PhantomData;

use ipnet::{Ipv4Net, Ipv6Net};
use log::{debug, trace};

use crate::codec::{self, Serializer};
use crate::error::{Error, Result};
use crate::inner::{Direction, Table};
use crate::prefix::mask_from_prefix_len;
use crate::Prefix;

mod iter;

pub use iter::*;

/// Subnet trie for IPv4 prefixes.
pub type Ipv4SubnetTrie = SubnetTrie<Ipv4Net>;

/// Subnet trie for IPv6 prefixes.
pub type Ipv6SubnetTrie = SubnetTrie<Ipv6Net>;

/// Binary trie of IP subnets. Every level of the tree consumes one bit of the address, so a prefix
/// of length `n` is stored in the node at depth `n` on the path spelled by its first `n` bits.
///
/// Every operation comes in two forms: one taking a parsed prefix (`insert_prefix`,
/// `search_prefix`, ...), and one taking text (`insert`, `search`, ...) that parses it with
/// [`Prefix::parse_prefix`] first and formats results with [`Prefix::canonical`].
#[derive(Clone)]
pub struct SubnetTrie<P> {
    pub(crate) table: Table,
    len: usize,
    serializer: Option<Serializer>,
    _family: PhantomData<fn() -> P>,
}

impl<P> Default for SubnetTrie<P> {
    fn default() -> Self {
        Self {
            table: Table::default(),
            len: 0,
            serializer: None,
            _family: PhantomData,
        }
    }
}

impl<P> SubnetTrie<P>
where
    P: Prefix,
{
    /// Create an empty trie without a serializer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty trie that uses `serializer` for [`Self::serialize`] and
    /// [`Self::deserialize`].
    ///
    /// ```
    /// # use ip_subnet_trie::*;
    /// # fn main() -> Result<()> {
    /// let mut trie = Ipv4SubnetTrie::with_serializer(Serializer::Flat);
    /// trie.insert("10.0.0.0/8")?;
    /// let bytes = trie.serialize()?;
    ///
    /// let mut other = Ipv4SubnetTrie::with_serializer(Serializer::Flat);
    /// other.deserialize(&bytes)?;
    /// assert_eq!(other.search("10.0.0.0/8")?, Some("10.0.0.0/8".to_string()));
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_serializer(serializer: Serializer) -> Self {
        Self {
            serializer: Some(serializer),
            ..Self::default()
        }
    }

    /// The serializer used by [`Self::serialize`] and [`Self::deserialize`].
    pub fn serializer(&self) -> Option<Serializer> {
        self.serializer
    }

    /// Replace the serializer used by [`Self::serialize`] and [`Self::deserialize`].
    pub fn set_serializer(&mut self, serializer: Option<Serializer>) {
        self.serializer = serializer;
    }

    /// Number of prefixes stored in the trie.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no prefix is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes in the tree, including the root and all intermediate nodes.
    ///
    /// ```
    /// # use ip_subnet_trie::*;
    /// # fn main() -> Result<()> {
    /// let mut trie = Ipv4SubnetTrie::new();
    /// assert_eq!(trie.node_count(), 1);
    /// trie.insert("10.0.0.0/8")?;
    /// assert_eq!(trie.node_count(), 9);
    /// trie.delete("10.0.0.0/8")?;
    /// assert_eq!(trie.node_count(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn node_count(&self) -> usize {
        self.table.live()
    }

    /// Remove all prefixes and nodes. The serializer is kept.
    pub fn clear(&mut self) {
        self.table = Table::default();
        self.len = 0;
    }

    /// Insert a prefix. Returns `true` if the prefix was not stored before.
    ///
    /// ```
    /// # use ip_subnet_trie::*;
    /// # fn main() -> Result<()> {
    /// let mut trie = Ipv4SubnetTrie::new();
    /// assert!(trie.insert("192.168.0.0/24")?);
    /// assert!(!trie.insert("192.168.0.0/24")?);
    /// assert!(trie.insert("192.168.0.1")?);
    /// assert!(trie.insert("not an address").is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn insert(&mut self, prefix: &str) -> Result<bool> {
        Ok(self.insert_prefix(&P::parse_prefix(prefix)?))
    }

    /// Search for a stored prefix and return its canonical text. Prefixes that only exist as
    /// branch points for longer prefixes are not found.
    ///
    /// ```
    /// # use ip_subnet_trie::*;
    /// # fn main() -> Result<()> {
    /// let mut trie = Ipv4SubnetTrie::new();
    /// trie.insert("192.168.0.1")?;
    /// assert_eq!(trie.search("192.168.0.1")?, Some("192.168.0.1/32".to_string()));
    /// assert_eq!(trie.search("192.168.0.0/24")?, None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn search(&self, prefix: &str) -> Result<Option<String>> {
        Ok(self
            .search_prefix(&P::parse_prefix(prefix)?)
            .map(|p| p.canonical()))
    }

    /// Check whether a prefix is stored.
    pub fn contains(&self, prefix: &str) -> Result<bool> {
        Ok(self.contains_prefix(&P::parse_prefix(prefix)?))
    }

    /// Get all stored prefixes strictly below `prefix`. The prefix itself does not need to be
    /// stored, only its path must exist.
    ///
    /// ```
    /// # use ip_subnet_trie::*;
    /// # use std::collections::HashSet;
    /// # fn main() -> Result<()> {
    /// let mut trie = Ipv4SubnetTrie::new();
    /// trie.insert("10.0.0.0/8")?;
    /// trie.insert("10.1.0.0/16")?;
    /// trie.insert("10.1.2.0/24")?;
    /// trie.insert("11.0.0.0/8")?;
    /// let want: HashSet<String> = ["10.1.0.0/16", "10.1.2.0/24"].map(String::from).into();
    /// assert_eq!(trie.get_children("10.0.0.0/8")?, want);
    /// assert_eq!(trie.get_children("10.0.0.0/7")?.len(), 4);
    /// # Ok(())
    /// # }
    /// ```
    pub fn get_children(&self, prefix: &str) -> Result<HashSet<String>> {
        Ok(self
            .children(&P::parse_prefix(prefix)?)
            .map(|p| p.canonical())
            .collect())
    }

    /// Get the longest stored prefix that strictly contains `prefix`. Returns `None` if `prefix`
    /// itself is not stored, or if it has no stored ancestor.
    ///
    /// ```
    /// # use ip_subnet_trie::*;
    /// # fn main() -> Result<()> {
    /// let mut trie = Ipv4SubnetTrie::new();
    /// trie.insert("10.255.249.0/24")?;
    /// trie.insert("10.255.249.64/26")?;
    /// trie.insert("10.255.249.104")?;
    /// assert_eq!(trie.get_parent("10.255.249.64/26")?, Some("10.255.249.0/24".to_string()));
    /// assert_eq!(trie.get_parent("10.255.249.104")?, Some("10.255.249.64/26".to_string()));
    /// assert_eq!(trie.get_parent("10.255.249.105")?, None);
    /// assert_eq!(trie.get_parent("10.255.249.0/24")?, None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn get_parent(&self, prefix: &str) -> Result<Option<String>> {
        Ok(self
            .parent_prefix(&P::parse_prefix(prefix)?)
            .map(|p| p.canonical()))
    }

    /// Delete a prefix and prune all nodes that only existed for it. Returns `true` if the prefix
    /// was stored.
    ///
    /// ```
    /// # use ip_subnet_trie::*;
    /// # fn main() -> Result<()> {
    /// let mut trie = Ipv4SubnetTrie::new();
    /// trie.insert("192.168.0.0/24")?;
    /// trie.insert("192.168.0.2")?;
    /// assert!(trie.delete("192.168.0.2")?);
    /// assert!(!trie.delete("192.168.0.2")?);
    /// assert_eq!(trie.search("192.168.0.2")?, None);
    /// assert_eq!(trie.node_count(), 25);
    /// # Ok(())
    /// # }
    /// ```
    pub fn delete(&mut self, prefix: &str) -> Result<bool> {
        Ok(self.delete_prefix(&P::parse_prefix(prefix)?))
    }

    /// Insert a parsed prefix. Returns `true` if the prefix was not stored before.
    pub fn insert_prefix(&mut self, prefix: &P) -> bool {
        let mut idx = 0;
        loop {
            match self.table.get_direction(idx, prefix) {
                Direction::Reached => break,
                Direction::Enter { next, .. } => idx = next,
                Direction::Missing { right } => {
                    let depth = self.table[idx].depth + 1;
                    let new = self.table.new_node(depth);
                    self.table.set_child(idx, new, right);
                    trace!("new node {new} at depth {depth}");
                    idx = new;
                }
            }
        }
        let node = &mut self.table[idx];
        let inserted = !node.terminal;
        node.terminal = true;
        if inserted {
            self.len += 1;
            debug!("inserted {}", prefix.canonical());
        }
        inserted
    }

    /// Search for a parsed prefix. The result is rebuilt from the path to the node, so host bits
    /// of `prefix` are cleared.
    pub fn search_prefix(&self, prefix: &P) -> Option<P> {
        let idx = self.find(prefix)?;
        if self.table[idx].terminal {
            Some(truncate(prefix, prefix.prefix_len()))
        } else {
            None
        }
    }

    /// Check whether a parsed prefix is stored.
    pub fn contains_prefix(&self, prefix: &P) -> bool {
        self.find(prefix)
            .map(|idx| self.table[idx].terminal)
            .unwrap_or(false)
    }

    /// Iterate over all stored prefixes strictly below `prefix` in pre-order (the `0` branch
    /// before the `1` branch). The iterator is empty if there is no node for `prefix`.
    pub fn children(&self, prefix: &P) -> Iter<'_, P> {
        match self.find(prefix) {
            Some(idx) => Iter::below(&self.table, idx, prefix.mask()),
            None => Iter::empty(&self.table),
        }
    }

    /// Get the longest stored prefix that strictly contains the stored prefix `prefix`.
    pub fn parent_prefix(&self, prefix: &P) -> Option<P> {
        let mut idx = 0;
        let mut nearest = None;
        loop {
            match self.table.get_direction(idx, prefix) {
                Direction::Reached => break,
                Direction::Enter { next, .. } => {
                    if self.table[idx].terminal {
                        nearest = Some(self.table[idx].depth);
                    }
                    idx = next;
                }
                Direction::Missing { .. } => return None,
            }
        }
        if !self.table[idx].terminal {
            return None;
        }
        nearest.map(|len| truncate(prefix, len))
    }

    /// Delete a parsed prefix and prune the path above it. Returns `true` if the prefix was
    /// stored.
    pub fn delete_prefix(&mut self, prefix: &P) -> bool {
        let mut path: Vec<(usize, bool)> = Vec::with_capacity(prefix.prefix_len() as usize);
        let mut idx = 0;
        loop {
            match self.table.get_direction(idx, prefix) {
                Direction::Reached => break,
                Direction::Enter { next, right } => {
                    path.push((idx, right));
                    idx = next;
                }
                Direction::Missing { .. } => return false,
            }
        }
        if !self.table[idx].terminal {
            return false;
        }
        self.table[idx].terminal = false;
        self.len -= 1;
        debug!("deleted {}", prefix.canonical());

        for (parent, right) in path.into_iter().rev() {
            match self.table.get_child(parent, right) {
                Some(child) if self.table[child].is_garbage() => {
                    self.table.free_child(parent, right);
                    trace!("pruned node {child} below node {parent}");
                }
                _ => break,
            }
        }
        true
    }

    /// Iterate over all stored prefixes in pre-order (lexicographic order of their bits).
    ///
    /// ```
    /// # use ip_subnet_trie::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<()> {
    /// let trie: Ipv4SubnetTrie = ["10.1.0.0/16", "10.0.0.0/8", "9.0.0.0/8"]
    ///     .into_iter()
    ///     .map(<Ipv4Net as Prefix>::parse_prefix)
    ///     .collect::<Result<_>>()?;
    /// let all: Vec<String> = trie.iter().map(|p| p.canonical()).collect();
    /// assert_eq!(all, vec!["9.0.0.0/8", "10.0.0.0/8", "10.1.0.0/16"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, P> {
        Iter::new(&self.table)
    }

    /// Encode the trie with the configured serializer.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let serializer = self.serializer.ok_or(Error::MissingSerializer)?;
        let bytes = serializer.encode(&self.table)?;
        debug!(
            "serialized {} nodes into {} bytes ({serializer:?})",
            self.node_count(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Replace the contents of the trie with a tree decoded by the configured serializer. An
    /// encoding without root leaves the trie empty. On error, the trie is left unchanged.
    pub fn deserialize(&mut self, bytes: &[u8]) -> Result<()> {
        let serializer = self.serializer.ok_or(Error::MissingSerializer)?;
        let table = serializer.decode(bytes, P::max_len())?;
        self.replace_table(table.unwrap_or_default());
        debug!(
            "deserialized {} prefixes in {} nodes ({serializer:?})",
            self.len,
            self.node_count()
        );
        Ok(())
    }

    /// Encode the trie in the tree-shaped JSON format.
    pub fn to_json(&self) -> Result<String> {
        codec::tree::encode(self)
    }

    /// Decode a trie from the tree-shaped JSON format. An encoding without root (`null`) yields
    /// an empty trie.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(codec::tree::decode(json)?.unwrap_or_default())
    }

    /// Encode the trie in the flattened binary format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        codec::flat::encode(self)
    }

    /// Decode a trie from the flattened binary format. An empty record list yields an empty
    /// trie.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(codec::flat::decode(bytes)?.unwrap_or_default())
    }

    pub(crate) fn from_table(table: Table) -> Self {
        let mut trie = Self::new();
        trie.replace_table(table);
        trie
    }

    fn replace_table(&mut self, table: Table) {
        self.len = Iter::<P>::new(&table).count();
        self.table = table;
    }

    /// Index of the node at `prefix`, whether terminal or not.
    fn find(&self, prefix: &P) -> Option<usize> {
        let mut idx = 0;
        loop {
            match self.table.get_direction(idx, prefix) {
                Direction::Reached => return Some(idx),
                Direction::Enter { next, .. } => idx = next,
                Direction::Missing { .. } => return None,
            }
        }
    }
}

/// The first `len` bits of `prefix` as a prefix of length `len`.
fn truncate<P: Prefix>(prefix: &P, len: u8) -> P {
    P::from_repr_len(prefix.repr() & mask_from_prefix_len(len), len)
}

impl<P: Prefix> PartialEq for SubnetTrie<P> {
    /// Two tries are equal if their trees have the same shape and the same nodes are terminal.
    fn eq(&self, other: &Self) -> bool {
        let mut nodes = vec![(0, 0)];
        while let Some((a, b)) = nodes.pop() {
            let (a, b) = (&self.table[a], &other.table[b]);
            if a.terminal != b.terminal {
                return false;
            }
            for right in [false, true] {
                match (a.child(right), b.child(right)) {
                    (Some(a), Some(b)) => nodes.push((a, b)),
                    (None, None) => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

impl<P: Prefix> Eq for SubnetTrie<P> {}

impl<P: Prefix> FromIterator<P> for SubnetTrie<P> {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<P: Prefix> Extend<P> for SubnetTrie<P> {
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        for prefix in iter {
            self.insert_prefix(&prefix);
        }
    }
}
