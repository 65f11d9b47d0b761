#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can check the
// reachable-record count, which is not part of the public API.

use crate::config::TableConfig;
use crate::hash_table::HashTable;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Add(usize, i32),
    AddAll(Vec<(usize, i32)>),
    Set(usize, i32),
    Get(usize),
    Remove(usize),
    ContainsKey(String),
    ContainsValue(i32),
    Clone,
    Iterate,
}

fn arb_key() -> impl Strategy<Value = String> {
    // Long keys wrap the hash accumulator.
    prop_oneof![3 => "[a-z]{0,5}", 1 => "[a-z0-9]{20,40}"]
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec(arb_key(), 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let val = -8i32..8;
        let op = prop_oneof![
            4 => (idx.clone(), val.clone()).prop_map(|(i, v)| OpI::Add(i, v)),
            1 => proptest::collection::vec((idx.clone(), val.clone()), 0..6).prop_map(OpI::AddAll),
            1 => (idx.clone(), val.clone()).prop_map(|(i, v)| OpI::Set(i, v)),
            1 => idx.clone().prop_map(OpI::Get),
            3 => idx.clone().prop_map(OpI::Remove),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::ContainsKey),
            1 => val.clone().prop_map(OpI::ContainsValue),
            1 => Just(OpI::Clone),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn check_against_model(
    sut: &HashTable<i32>,
    model: &HashMap<String, i32>,
) -> Result<(), TestCaseError> {
    prop_assert_eq!(sut.len(), model.len());
    prop_assert_eq!(sut.is_empty(), model.is_empty());
    prop_assert_eq!(sut.reachable(), sut.len());
    prop_assert!(sut.capacity() > 0);
    Ok(())
}

fn run(
    config: Option<TableConfig>,
    pool: Vec<String>,
    ops: Vec<OpI>,
    check_window: bool,
) -> Result<(), TestCaseError> {
    let mut sut: HashTable<i32> = match config {
        Some(cfg) => HashTable::with_config(cfg).unwrap(),
        None => HashTable::new(),
    };
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        let cap_before = sut.capacity();
        match op {
            OpI::Add(i, v) => {
                let k = &pool[i];
                let already = model.contains_key(k);
                let added = sut.add(k.as_str(), v).unwrap();
                prop_assert_eq!(added, !already, "add stores only new keys");
                model.entry(k.clone()).or_insert(v);
            }
            OpI::AddAll(pairs) => {
                let mut expected = 0;
                for &(i, v) in &pairs {
                    if !model.contains_key(&pool[i]) {
                        model.insert(pool[i].clone(), v);
                        expected += 1;
                    }
                }
                let n = sut
                    .add_all(pairs.iter().map(|&(i, v)| (pool[i].as_str(), v)))
                    .unwrap();
                prop_assert_eq!(n, expected);
            }
            OpI::Set(i, v) => {
                let k = &pool[i];
                let changed = sut.set(k, v);
                match model.get_mut(k) {
                    Some(mv) => {
                        prop_assert!(changed);
                        *mv = v;
                    }
                    None => prop_assert!(!changed, "set on absent key is a no-op"),
                }
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                match (sut.remove(k), model.remove(k)) {
                    (Some(r), Some(mv)) => {
                        prop_assert_eq!(r.key(), k.as_str());
                        prop_assert_eq!(*r.value(), mv);
                    }
                    (None, None) => {}
                    (s, m) => prop_assert!(false, "remove mismatch: {:?} vs {:?}", s, m),
                }
                prop_assert!(!sut.contains_key(k));
            }
            OpI::ContainsKey(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            OpI::ContainsValue(v) => {
                prop_assert_eq!(sut.contains_value(&v), model.values().any(|&m| m == v));
            }
            OpI::Clone => {
                let mut c = sut.clone();
                check_against_model(&c, &model)?;
                for (k, v) in &model {
                    prop_assert_eq!(c.get(k), Some(v));
                }
                // Mutating the copy leaves the source alone.
                for k in model.keys() {
                    c.remove(k);
                }
                prop_assert!(c.is_empty());
            }
            OpI::Iterate => {
                let keys: Vec<&str> = sut.keys().collect();
                let values: Vec<&i32> = sut.values().collect();
                prop_assert_eq!(keys.len(), values.len());
                for (k, v) in keys.iter().zip(values) {
                    prop_assert_eq!(model.get(*k), Some(v));
                }
                let s_keys: BTreeSet<&str> = keys.into_iter().collect();
                let m_keys: BTreeSet<&str> = model.keys().map(String::as_str).collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        check_against_model(&sut, &model)?;
        // Right after a rescale the load factor sits inside the window.
        if check_window && sut.capacity() != cap_before && !sut.is_empty() {
            let lf = sut.load_factor();
            prop_assert!((0.25..=0.75).contains(&lf), "load factor {} after rescale", lf);
        }
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap with
// the add-never-overwrites rule.
// Invariants exercised across random operation sequences:
// - `add` stores only new keys and never changes an existing value.
// - `set` overwrites present keys and is a no-op for absent ones.
// - `remove` returns the matching record; absent keys change nothing.
// - `len` equals the number of records reachable through the chains.
// - Immediately after a rescale, 0.25 <= load factor <= 0.75.
// - Clones are equal in content and independent in storage.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run(None, pool, ops, true)?;
    }
}

// Property: Same invariants with every record forced into a single bucket:
// one bucket, no shrink (min 0.0) and no growth before a million records per
// bucket. This stresses chain walking, head and interior unlinking.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_single_chain((pool, ops) in arb_scenario()) {
        let cfg = TableConfig::new()
            .with_initial_capacity(1)
            .with_load_factors(0.0, 1_000_000.0);
        run(Some(cfg), pool, ops, false)?;
    }
}
