use super::*;

qc!(children, _children);
fn _children((trie, start): (SubnetTrie<TestPrefix>, TestPrefix)) -> bool {
    let want: Vec<TestPrefix> = trie
        .iter()
        .filter(|p| start.contains(p) && *p != start)
        .collect();
    trie.children(&start).eq(want)
}

qc!(children_text, _children_text);
fn _children_text((ops, start): (Vec<Operation<TestPrefix>>, TestPrefix)) -> bool {
    let (trie, model) = replay(&ops);
    let want: HashSet<String> = model
        .iter()
        .filter(|p| start.contains(p) && **p != start)
        .map(|p| p.canonical())
        .collect();
    trie.get_children(&start.canonical()).ok() == Some(want)
}

qc!(parent, _parent);
fn _parent((ops, target): (Vec<Operation<TestPrefix>>, TestPrefix)) -> bool {
    let (trie, model) = replay(&ops);
    let want = if model.contains(&target) {
        model
            .iter()
            .filter(|p| p.contains(&target) && **p != target)
            .max_by_key(|p| p.1)
            .copied()
    } else {
        None
    };
    trie.parent_prefix(&target) == want
}

qc!(parent_of_stored, _parent_of_stored);
fn _parent_of_stored(trie: SubnetTrie<TestPrefix>) -> bool {
    // every parent is stored, contains the prefix, and no stored prefix sits in between
    trie.iter().all(|p| match trie.parent_prefix(&p) {
        Some(parent) => {
            trie.contains_prefix(&parent)
                && parent.contains(&p)
                && parent.1 < p.1
                && trie
                    .iter()
                    .all(|q| !(parent.contains(&q) && q.contains(&p)) || q == parent || q == p)
        }
        None => trie.iter().all(|q| q == p || !q.contains(&p)),
    })
}
