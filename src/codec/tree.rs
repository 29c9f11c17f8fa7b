//! Tree-shaped encoding.
//!
//! Every node is written as `{"is_end": <terminal>, "children": [<slot 0>, <slot 1>]}`, where an
//! absent child is `null`. The root is the outermost object.
//!
//! ```
//! # use ip_subnet_trie::*;
//! # fn main() -> Result<()> {
//! let mut trie = Ipv4SubnetTrie::new();
//! trie.insert("128.0.0.0/1")?;
//! assert_eq!(
//!     codec::tree::encode(&trie)?,
//!     r#"{"is_end":false,"children":[null,{"is_end":true,"children":[null,null]}]}"#
//! );
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::result::Result as StdResult;

use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::inner::{Node, Table};
use crate::{Prefix, SubnetTrie};

/// Encode a trie as compact JSON.
pub fn encode<P: Prefix>(trie: &SubnetTrie<P>) -> Result<String> {
    encode_table(&trie.table)
}

/// Encode a trie as indented JSON.
pub fn encode_pretty<P: Prefix>(trie: &SubnetTrie<P>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&NodeRef {
        table: &trie.table,
        idx: 0,
    })?)
}

/// Decode a trie from JSON. Returns `None` for an encoding without root (`null`).
pub fn decode<P: Prefix>(json: &str) -> Result<Option<SubnetTrie<P>>> {
    Ok(decode_table(json.as_bytes(), P::max_len())?.map(SubnetTrie::from_table))
}

pub(crate) fn encode_table(table: &Table) -> Result<String> {
    Ok(serde_json::to_string(&NodeRef { table, idx: 0 })?)
}

pub(crate) fn decode_table(json: &[u8], max_depth: u8) -> Result<Option<Table>> {
    // nesting is bounded by `max_depth` while parsing, which replaces the recursion limit of
    // serde_json (too low for a 128 bit path).
    let mut deserializer = serde_json::Deserializer::from_slice(json);
    deserializer.disable_recursion_limit();
    let mut builder = Builder {
        nodes: Vec::new(),
        max_depth,
        too_deep: false,
    };
    let root = ChildSeed {
        builder: &mut builder,
        depth: 0,
    }
    .deserialize(&mut deserializer)
    .and_then(|root| deserializer.end().map(|()| root));
    match root {
        Ok(Some(_)) => Ok(Some(Table::from_nodes(builder.nodes))),
        Ok(None) => Ok(None),
        Err(_) if builder.too_deep => Err(super::too_deep(max_depth)),
        Err(e) => Err(e.into()),
    }
}

/// Nodes decoded so far. A node is pushed before its children, so the root is at index 0.
struct Builder {
    nodes: Vec<Node>,
    max_depth: u8,
    too_deep: bool,
}

/// A child slot: either `null` or a node at `depth`.
struct ChildSeed<'a> {
    builder: &'a mut Builder,
    depth: u8,
}

/// The two child slots of a node whose children sit at `depth`.
struct ChildrenSeed<'a> {
    builder: &'a mut Builder,
    depth: u8,
}

/// The fields of the node at `idx`.
struct NodeVisitor<'a> {
    builder: &'a mut Builder,
    idx: usize,
}

#[derive(Deserialize)]
#[serde(field_identifier, rename_all = "snake_case")]
enum Field {
    IsEnd,
    Children,
    #[serde(other)]
    Other,
}

const FIELDS: &[&str] = &["is_end", "children"];
const TWO_CHILDREN: &str = "an array of two children";

impl<'de> DeserializeSeed<'de> for ChildSeed<'_> {
    type Value = Option<usize>;

    fn deserialize<D>(self, deserializer: D) -> StdResult<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(self)
    }
}

impl<'de> Visitor<'de> for ChildSeed<'_> {
    type Value = Option<usize>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a trie node or null")
    }

    fn visit_none<E: de::Error>(self) -> StdResult<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> StdResult<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ChildSeed { builder, depth } = self;
        if depth > builder.max_depth {
            builder.too_deep = true;
            return Err(de::Error::custom(format!(
                "tree is deeper than {} bits",
                builder.max_depth
            )));
        }
        let idx = builder.nodes.len();
        builder.nodes.push(Node::new(depth));
        deserializer.deserialize_struct("TreeNode", FIELDS, NodeVisitor { builder, idx })?;
        Ok(Some(idx))
    }
}

impl<'de> Visitor<'de> for NodeVisitor<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a trie node with `is_end` and `children`")
    }

    fn visit_map<A>(self, mut map: A) -> StdResult<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        let NodeVisitor { builder, idx } = self;
        let mut is_end = None;
        let mut children = None;
        while let Some(key) = map.next_key::<Field>()? {
            match key {
                Field::IsEnd => {
                    if is_end.is_some() {
                        return Err(de::Error::duplicate_field("is_end"));
                    }
                    is_end = Some(map.next_value::<bool>()?);
                }
                Field::Children => {
                    if children.is_some() {
                        return Err(de::Error::duplicate_field("children"));
                    }
                    let depth = builder.nodes[idx].depth + 1;
                    children = Some(map.next_value_seed(ChildrenSeed {
                        builder: &mut *builder,
                        depth,
                    })?);
                }
                Field::Other => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        let is_end = is_end.ok_or_else(|| de::Error::missing_field("is_end"))?;
        let [left, right] = children.ok_or_else(|| de::Error::missing_field("children"))?;
        let node = &mut builder.nodes[idx];
        node.terminal = is_end;
        node.left = left;
        node.right = right;
        Ok(())
    }
}

impl<'de> DeserializeSeed<'de> for ChildrenSeed<'_> {
    type Value = [Option<usize>; 2];

    fn deserialize<D>(self, deserializer: D) -> StdResult<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_tuple(2, self)
    }
}

impl<'de> Visitor<'de> for ChildrenSeed<'_> {
    type Value = [Option<usize>; 2];

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(TWO_CHILDREN)
    }

    fn visit_seq<A>(self, mut seq: A) -> StdResult<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let ChildrenSeed { builder, depth } = self;
        let mut slots = [None; 2];
        for (i, slot) in slots.iter_mut().enumerate() {
            let child = ChildSeed {
                builder: &mut *builder,
                depth,
            };
            *slot = seq
                .next_element_seed(child)?
                .ok_or_else(|| de::Error::invalid_length(i, &TWO_CHILDREN))?;
        }
        if seq.next_element::<IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(3, &TWO_CHILDREN));
        }
        Ok(slots)
    }
}

/// Borrowed view of a node in the table, written as `{"is_end": .., "children": [.., ..]}`.
struct NodeRef<'a> {
    table: &'a Table,
    idx: usize,
}

impl Serialize for NodeRef<'_> {
    fn serialize<S>(&self, serializer: S) -> StdResult<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let node = &self.table[self.idx];
        let children = [node.left, node.right].map(|child| {
            child.map(|idx| NodeRef {
                table: self.table,
                idx,
            })
        });
        let mut s = serializer.serialize_struct("TreeNode", 2)?;
        s.serialize_field("is_end", &node.terminal)?;
        s.serialize_field("children", &children)?;
        s.end()
    }
}
