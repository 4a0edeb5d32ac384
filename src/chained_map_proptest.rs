#![cfg(test)]

// Property tests for ChainedMap kept inside the crate so every step can
// also check the structural invariants of the underlying chains.

use crate::hashing::{HashCode, PolynomialRollingHash, StdHash, StringHash};
use crate::ChainedMap;
use hashbrown::{HashMap, HashSet};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::hash_map::RandomState;

// Pool-indexed operations so shrinking moves toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    InsertCloned(usize, i32),
    GetOrDefault(usize),
    Erase(usize),
    EraseAt(usize),
    Find(usize),
    Contains(String),
    Mutate(usize, i32),
    Retain(i32),
    Reset { take: bool },
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::InsertCloned(i, v)),
            2 => idx.clone().prop_map(Op::GetOrDefault),
            2 => idx.clone().prop_map(Op::Erase),
            2 => any::<usize>().prop_map(Op::EraseAt),
            2 => idx.clone().prop_map(Op::Find),
            1 => "[a-z]{0,5}".prop_map(Op::Contains),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => any::<i32>().prop_map(Op::Retain),
            1 => any::<bool>().prop_map(|take| Op::Reset { take }),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Sends every key to the same bucket.
#[derive(Clone)]
struct ConstHash;

impl<Q: ?Sized> HashCode<Q> for ConstHash {
    fn code(&self, _key: &Q) -> u64 {
        0
    }
}

/// Traversal must be ascending by bucket and, inside a bucket, newest first.
fn check_order<H>(
    sut: &ChainedMap<String, i32, H>,
    stamps: &HashMap<String, u64>,
) -> Result<(), TestCaseError>
where
    H: HashCode<String>,
{
    let mut prev: Option<(usize, u64)> = None;
    let mut seen = 0;
    for (k, _) in sut.iter() {
        let b = sut.bucket(k);
        let stamp = stamps[k];
        if let Some((pb, ps)) = prev {
            prop_assert!(
                pb < b || (pb == b && ps > stamp),
                "order broken at {:?}: ({}, {}) after ({}, {})",
                k,
                b,
                stamp,
                pb,
                ps
            );
        }
        prev = Some((b, stamp));
        seen += 1;
    }
    prop_assert_eq!(seen, sut.len());
    Ok(())
}

// Model: a hashbrown map of live entries plus an insertion clock per key,
// which pins down the expected within-bucket order.
fn run<H>(
    mut sut: ChainedMap<String, i32, H>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    H: HashCode<String> + HashCode<str> + Clone,
{
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut stamps: HashMap<String, u64> = HashMap::new();
    let mut clock = 0u64;

    for op in ops {
        let cloned = matches!(op, Op::InsertCloned(..));
        match op {
            Op::Insert(i, v) | Op::InsertCloned(i, v) => {
                let k = pool[i].clone();
                let already = model.contains_key(&k);
                let (c, inserted) = if cloned {
                    sut.insert_cloned(&k, &v)
                } else {
                    sut.insert(k.clone(), v)
                };
                prop_assert_eq!(inserted, !already, "inserted flag for {:?}", k);
                if inserted {
                    model.insert(k.clone(), v);
                    stamps.insert(k.clone(), clock);
                    clock += 1;
                }
                // Duplicates leave the stored value alone.
                prop_assert_eq!(c.value(&sut), model.get(&k));
            }
            Op::GetOrDefault(i) => {
                let k = pool[i].clone();
                if !model.contains_key(&k) {
                    model.insert(k.clone(), 0);
                    stamps.insert(k.clone(), clock);
                    clock += 1;
                }
                let v = *sut.get_or_default(k.clone());
                prop_assert_eq!(v, model[&k]);
            }
            Op::Erase(i) => {
                let k = &pool[i];
                let removed = sut.erase(k.as_str());
                let expected = model.remove(k).is_some();
                stamps.remove(k);
                prop_assert_eq!(removed, usize::from(expected));
                prop_assert!(sut.find(k.as_str()).is_end());
            }
            Op::EraseAt(j) => {
                if sut.is_empty() {
                    prop_assert!(sut.erase_at(sut.begin()).is_end());
                } else {
                    let mut c = sut.begin();
                    for _ in 0..j % sut.len() {
                        c = sut.advance(c);
                    }
                    let expected_next = sut.advance(c);
                    let k = c.key(&sut).cloned().expect("cursor inside the map");
                    let next = sut.erase_at(c);
                    prop_assert_eq!(next, expected_next);
                    prop_assert!(c.value(&sut).is_none(), "erased cursor must not resolve");
                    model.remove(&k);
                    stamps.remove(&k);
                }
            }
            Op::Find(i) => {
                let k = &pool[i];
                let c = sut.find(k.as_str());
                prop_assert_eq!(c.is_end(), !model.contains_key(k));
                prop_assert_eq!(c.value(&sut), model.get(k));
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
            }
            Op::Mutate(i, d) => {
                let k = &pool[i];
                match sut.get_mut(k.as_str()) {
                    Some(v) => {
                        *v = v.wrapping_add(d);
                        let mv = model.get_mut(k).expect("model has the key");
                        *mv = mv.wrapping_add(d);
                    }
                    None => prop_assert!(!model.contains_key(k)),
                }
            }
            Op::Retain(r) => {
                let r = r.rem_euclid(3);
                sut.retain(|_, v| v.rem_euclid(3) != r);
                model.retain(|_, v| v.rem_euclid(3) != r);
                stamps.retain(|k, _| model.contains_key(k));
            }
            Op::Reset { take } => {
                if take {
                    let moved = sut.take();
                    moved.chains.assert_consistent();
                    prop_assert_eq!(moved.bucket_count(), sut.bucket_count());
                    prop_assert_eq!(moved.len(), model.len());
                    for (k, v) in &model {
                        prop_assert_eq!(moved.get(k.as_str()), Some(v));
                    }
                } else {
                    sut.clear();
                }
                prop_assert!(sut.is_empty());
                model.clear();
                stamps.clear();
            }
        }

        // Post-conditions after each op.
        sut.chains.assert_consistent();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k.as_str()), Some(v));
        }
        check_order(&sut, &stamps)?;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_state_machine_std_hash((pool, ops) in arb_scenario(), req in 1usize..40) {
        run(ChainedMap::with_hasher(req, StdHash::new(RandomState::new())), &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_default_hash((pool, ops) in arb_scenario(), req in 1usize..40) {
        run(ChainedMap::with_buckets(req), &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_polynomial((pool, ops) in arb_scenario(), req in 1usize..40) {
        run(ChainedMap::with_hasher(req, PolynomialRollingHash), &pool, ops)?;
    }

    // Every key collides: one long chain, equality does all the work.
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario(), req in 1usize..40) {
        run(ChainedMap::with_hasher(req, ConstHash), &pool, ops)?;
    }
}

proptest! {
    // Erasing at the cursor and continuing from the returned cursor visits
    // every entry exactly once.
    #[test]
    fn prop_erase_while_walking(
        keys in proptest::collection::hash_set("[a-z]{1,4}", 0..60),
        req in 1usize..20,
        drop_mod in 1u64..4,
    ) {
        let mut m = ChainedMap::with_hasher(req, StringHash::Fnv1a);
        for k in &keys {
            m.insert(k.clone(), k.len() as u64);
        }
        let mut visited = HashSet::new();
        let mut kept = HashSet::new();
        let mut c = m.begin();
        while let Some(k) = c.key(&m).cloned() {
            prop_assert!(visited.insert(k.clone()), "visited {:?} twice", k);
            if (k.len() as u64) % drop_mod == 0 {
                c = m.erase_at(c);
            } else {
                kept.insert(k);
                c = m.advance(c);
            }
        }
        prop_assert_eq!(visited.len(), keys.len());
        prop_assert_eq!(m.len(), kept.len());
        m.chains.assert_consistent();
        let remaining: HashSet<String> = m.keys().cloned().collect();
        prop_assert_eq!(remaining, kept);
    }

    // bucket(k) is the stored code modulo the bucket count, and never moves.
    #[test]
    fn prop_bucket_is_code_mod_count(
        keys in proptest::collection::vec("[ -~]{0,8}", 1..40),
        req in 1usize..200,
    ) {
        let mut m = ChainedMap::with_hasher(req, PolynomialRollingHash);
        let n = m.bucket_count() as u64;
        let before: Vec<usize> = keys.iter().map(|k| m.bucket(k.as_str())).collect();
        for (i, k) in keys.iter().enumerate() {
            m.insert(k.clone(), i);
        }
        for (k, b) in keys.iter().zip(&before) {
            prop_assert_eq!(*b, (PolynomialRollingHash::hash_bytes(k.as_bytes()) % n) as usize);
            prop_assert_eq!(m.bucket(k.as_str()), *b);
            prop_assert!(m.bucket_iter(*b).any(|(kk, _)| kk == k));
        }
    }
}
