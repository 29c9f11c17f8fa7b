use super::*;
use itertools::Itertools;

qc!(new, _new);
fn _new(list: Vec<TestPrefix>) -> bool {
    let trie: SubnetTrie<TestPrefix> = list.iter().copied().collect();
    let want = list.into_iter().sorted().dedup().collect::<Vec<_>>();
    trie.len() == want.len() && trie.iter().eq(want)
}

qc!(operations, _operations);
fn _operations(ops: Vec<Operation<TestPrefix>>) -> bool {
    let (trie, model) = replay(&ops);
    trie.iter().eq(model.iter().copied()) && trie.len() == model.len()
}

qc!(search, _search);
fn _search((ops, probe): (Vec<Operation<TestPrefix>>, TestPrefix)) -> bool {
    let (trie, model) = replay(&ops);
    let want = model.get(&probe).copied();
    trie.search_prefix(&probe) == want && trie.contains_prefix(&probe) == want.is_some()
}

qc!(search_text, _search_text);
fn _search_text((ops, probe): (Vec<Operation<TestPrefix>>, TestPrefix)) -> bool {
    let (trie, model) = replay(&ops);
    let want = model.get(&probe).map(|p| p.canonical());
    trie.search(&probe.canonical()).ok() == Some(want)
}

qc!(node_count, _node_count);
fn _node_count(ops: Vec<Operation<TestPrefix>>) -> bool {
    let (trie, model) = replay(&ops);
    trie.node_count() == expected_nodes(&model)
}

qc!(no_dangling_nodes, _no_dangling_nodes);
fn _no_dangling_nodes(ops: Vec<Operation<TestPrefix>>) -> bool {
    let (trie, _) = replay(&ops);
    let mut nodes = vec![0];
    while let Some(idx) = nodes.pop() {
        let node = &trie.table[idx];
        if idx != 0 && node.is_garbage() {
            return false;
        }
        nodes.extend(node.children().map(|(_, c)| c));
    }
    true
}

qc!(delete_everything, _delete_everything);
fn _delete_everything(list: Vec<TestPrefix>) -> bool {
    let mut trie: SubnetTrie<TestPrefix> = list.iter().copied().collect();
    for p in &list {
        trie.delete_prefix(p);
    }
    trie.is_empty() && trie.node_count() == 1 && trie == SubnetTrie::new()
}

qc!(equality, _equality);
fn _equality(ops: Vec<Operation<TestPrefix>>) -> bool {
    let (trie, model) = replay(&ops);
    // a trie built from the final contents only has the same shape
    let fresh: SubnetTrie<TestPrefix> = model.into_iter().collect();
    trie == fresh
}
