//! Module for testing using fuzzing (quickcheck)
#![allow(clippy::type_complexity)]

use std::collections::{BTreeSet, HashSet};
use std::fmt::Debug;
use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use quickcheck::Arbitrary;

use crate::prefix::mask_from_prefix_len;
use crate::*;

mod basic;
mod codecs;
mod traversals;

#[derive(Debug, PartialEq, Clone, Copy)]
enum Operation<P> {
    Add(P),
    Remove(P),
}

#[cfg(miri)]
const DEFAULT_NUM_TESTS: usize = 10;
#[cfg(not(miri))]
const DEFAULT_NUM_TESTS: usize = 10000;
const DEFAULT_GEN_SIZE: usize = 100;

fn proptest_runner<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F) {
    let num_tests: usize = std::env::var("QUICKCHECK_TESTS")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_NUM_TESTS);

    let gen_size: usize = std::env::var("QUICKCHECK_GENERATOR_SIZE")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_GEN_SIZE);

    let mut gen = quickcheck::Gen::new(gen_size);

    // sample all inputs
    for _ in 0..num_tests {
        let input = A::arbitrary(&mut gen);
        let input_c = input.clone();
        let success = f(input_c);
        if !success {
            shrink_failure(f, input)
        }
    }
}

fn shrink_failure<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F, input: A) -> ! {
    for i in input.shrink() {
        let i_c = i.clone();
        let success = f(i_c);
        if !success {
            shrink_failure(f, i)
        }
    }
    // if we reach this point, then all shrunken inputs work. Therefore, `inputs` is the minimal
    // input
    panic!(
        "[QUICKCHECK] Test case failed!\n  Minimal input:\n    {:?}",
        input
    );
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! qc {
    ($name:ident, $f:ident) => {
        #[test]
        fn $name() {
            proptest_runner($f)
        }
    };
}

/// Replay the operations on a trie and on a sorted set of the same prefixes. The set iterates in
/// the same order as the trie.
fn replay(ops: &[Operation<TestPrefix>]) -> (SubnetTrie<TestPrefix>, BTreeSet<TestPrefix>) {
    let mut trie = SubnetTrie::new();
    let mut model = BTreeSet::new();
    for op in ops {
        match *op {
            Operation::Add(p) => {
                if trie.insert_prefix(&p) != model.insert(p) {
                    panic!("insert of {p:?} disagrees with the model");
                }
            }
            Operation::Remove(p) => {
                if trie.delete_prefix(&p) != model.remove(&p) {
                    panic!("delete of {p:?} disagrees with the model");
                }
            }
        }
    }
    (trie, model)
}

/// The number of nodes a trie with exactly these prefixes must have: one per distinct prefix on
/// the paths to them, plus the root.
fn expected_nodes(model: &BTreeSet<TestPrefix>) -> usize {
    let mut nodes = BTreeSet::from([TestPrefix::zero()]);
    for p in model {
        for len in 0..=p.1 {
            nodes.insert(TestPrefix::from_repr_len(p.0, len));
        }
    }
    nodes.len()
}

impl<P: Prefix + Arbitrary> Arbitrary for SubnetTrie<P> {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        <Vec<P> as Arbitrary>::arbitrary(g).into_iter().collect()
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let elems = self.iter().collect::<Vec<_>>();
        let shrinked = elems.shrink();
        Box::new(shrinked.map(SubnetTrie::from_iter))
    }
}

impl<P: Arbitrary> Arbitrary for Operation<P> {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let p = P::arbitrary(g);
        if g.choose(&[
            true, true, true, true, true, true, true, false, false, false,
        ])
        .copied()
        .unwrap_or_default()
        {
            Self::Add(p)
        } else {
            Self::Remove(p)
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            Operation::Add(p) => Box::new(p.clone().shrink().map(Operation::Add)),
            Operation::Remove(p) => Box::new(p.clone().shrink().map(Operation::Remove)),
        }
    }
}

/// IPv4-shaped prefix whose lengths are drawn from a small range, such that random prefixes
/// collide and nest often.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
struct TestPrefix(u32, u8);

impl Debug for TestPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let addr = format!("{:032b}", self.0)[..10].to_string();
        write!(f, "0b{addr}/{}", self.1)
    }
}

impl Arbitrary for TestPrefix {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        #[rustfmt::skip]
        let len: u8 = *g
            .choose(&[
                0,
                1, 1,
                2, 2, 2,
                3, 3, 3, 3,
                4, 4, 4, 4, 4,
                5, 5, 5, 5, 5, 5,
                6, 6, 6, 6, 6, 6, 6,
                7, 7, 7, 7, 7, 7, 7, 7,
                8, 8, 8, 8, 8, 8, 8, 8, 8,
                9, 9, 9, 9, 9, 9, 9, 9, 9, 9,
            ])
            .unwrap();
        let x = u32::arbitrary(g);
        Self::from_repr_len(x, len)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        if self.1 == 0 {
            quickcheck::empty_shrinker()
        } else {
            let len = self.1 - 1;
            let x = Self::from_repr_len(self.0, len);
            quickcheck::single_shrinker(x)
        }
    }
}

impl Prefix for TestPrefix {
    type R = u32;

    fn repr(&self) -> Self::R {
        self.0
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }

    fn from_repr_len(repr: Self::R, len: u8) -> Self {
        Self(repr & mask_from_prefix_len::<u32>(len), len)
    }

    fn parse_prefix(s: &str) -> Result<Self> {
        let net = <Ipv4Net as Prefix>::parse_prefix(s)?;
        Ok(Self::from_repr_len(net.repr(), Prefix::prefix_len(&net)))
    }

    fn canonical(&self) -> String {
        format!("{}/{}", Ipv4Addr::from(self.0), self.1)
    }
}
