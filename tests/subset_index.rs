//! Randomized soundness of subset and superset queries.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use akh_diag::subset_index::SubsetIndex;

fn random_set(rng: &mut StdRng, max_len: usize) -> BTreeSet<u8> {
    let len = rng.gen_range(0..=max_len);
    (0..len).map(|_| rng.gen_range(0..12)).collect()
}

#[test]
fn queries_agree_with_linear_scan() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..50 {
        let mut index = SubsetIndex::new();
        let mut stored: Vec<BTreeSet<u8>> = Vec::new();
        for value in 0..rng.gen_range(0..30) {
            let key = random_set(&mut rng, 5);
            if index.insert(key.clone(), value).is_none() {
                stored.push(key);
            }
        }
        assert_eq!(index.len(), stored.len());

        for _ in 0..40 {
            let query = random_set(&mut rng, 8);
            let subsets: BTreeSet<_> = stored.iter().filter(|k| k.is_subset(&query)).cloned().collect();
            let supersets: BTreeSet<_> = stored.iter().filter(|k| k.is_superset(&query)).cloned().collect();

            assert_eq!(index.contains_subset(&query), !subsets.is_empty(), "query {query:?}");
            assert_eq!(index.contains_superset(&query), !supersets.is_empty(), "query {query:?}");
            assert_eq!(
                index.subsets_of(&query).into_iter().map(|(k, _)| k).collect::<BTreeSet<_>>(),
                subsets
            );
            assert_eq!(
                index.supersets_of(&query).into_iter().map(|(k, _)| k).collect::<BTreeSet<_>>(),
                supersets
            );
        }
    }
}

#[test]
fn removal_keeps_sizes_consistent() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut index = SubsetIndex::new();
    let mut stored = BTreeSet::new();
    for step in 0..500u32 {
        let key = random_set(&mut rng, 4);
        if rng.gen_bool(0.6) {
            index.insert(key.clone(), step);
            stored.insert(key);
        } else {
            assert_eq!(index.remove(&key).is_some(), stored.remove(&key));
        }
        assert_eq!(index.len(), stored.len());
    }
    let keys: BTreeSet<_> = index.keys().collect();
    assert_eq!(keys, stored);
}
