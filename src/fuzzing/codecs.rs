use super::*;

qc!(tree_roundtrip, _tree_roundtrip);
fn _tree_roundtrip(ops: Vec<Operation<TestPrefix>>) -> bool {
    let (trie, _) = replay(&ops);
    let Ok(json) = codec::tree::encode(&trie) else {
        return false;
    };
    match codec::tree::decode::<TestPrefix>(&json) {
        Ok(Some(back)) => {
            back == trie
                && back.len() == trie.len()
                && back.node_count() == trie.node_count()
                && back.iter().eq(trie.iter())
        }
        _ => false,
    }
}

qc!(flat_roundtrip, _flat_roundtrip);
fn _flat_roundtrip(ops: Vec<Operation<TestPrefix>>) -> bool {
    let (trie, _) = replay(&ops);
    let Ok(bytes) = codec::flat::encode(&trie) else {
        return false;
    };
    match codec::flat::decode::<TestPrefix>(&bytes) {
        Ok(Some(back)) => {
            back == trie
                && back.len() == trie.len()
                && back.node_count() == trie.node_count()
                && back.iter().eq(trie.iter())
        }
        _ => false,
    }
}

qc!(flat_records, _flat_records);
fn _flat_records(trie: SubnetTrie<TestPrefix>) -> bool {
    let records = codec::flat::records(&trie);
    records.len() == trie.node_count()
        && records.iter().filter(|r| r.is_end).count() == trie.len()
        && bincode::serialized_size(&records).ok() == Some(8 + 3 * records.len() as u64)
}

qc!(configured_serializers, _configured_serializers);
fn _configured_serializers(trie: SubnetTrie<TestPrefix>) -> bool {
    [Serializer::Tree, Serializer::Flat].into_iter().all(|s| {
        let mut trie = trie.clone();
        trie.set_serializer(Some(s));
        let Ok(bytes) = trie.serialize() else {
            return false;
        };
        let mut back = SubnetTrie::<TestPrefix>::with_serializer(s);
        back.insert_prefix(&TestPrefix::zero());
        back.deserialize(&bytes).is_ok() && back == trie && back.len() == trie.len()
    })
}

qc!(codecs_agree, _codecs_agree);
fn _codecs_agree(trie: SubnetTrie<TestPrefix>) -> bool {
    let json = trie.to_json().and_then(|j| SubnetTrie::<TestPrefix>::from_json(&j));
    let bytes = trie.to_bytes().and_then(|b| SubnetTrie::<TestPrefix>::from_bytes(&b));
    match (json, bytes) {
        (Ok(a), Ok(b)) => a == b && a.iter().eq(b.iter()),
        _ => false,
    }
}
