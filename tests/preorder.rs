//! Soundness of the preorder cache against a real preorder.
//!
//! Divisibility on small integers is reflexive and transitive but not total,
//! so it exercises both positive and negative propagation.

use std::collections::HashSet;
use std::convert::Infallible;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use akh_diag::preorder::{PreorderCache, wrap_preorder};

fn divides(a: &u32, b: &u32) -> Result<bool, Infallible> {
    Ok(b % a == 0)
}

#[test]
fn cached_facts_always_agree_with_the_oracle() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut cached = wrap_preorder(divides);
    let mut asked = HashSet::new();

    for _ in 0..2_000 {
        let a = rng.gen_range(1..=40);
        let b = rng.gen_range(1..=40);
        asked.insert((a, b));
        assert_eq!(cached.test(&a, &b), divides(&a, &b));
    }

    let cache = cached.cache();
    for a in 1..=40u32 {
        for b in 1..=40u32 {
            if let Some(known) = cache.get(&a, &b) {
                assert_eq!(Ok(known), divides(&a, &b), "wrong fact for {a} | {b}");
            }
        }
    }
    assert!(cached.oracle_calls() <= asked.len());
}

#[test]
fn transitive_reuse_needs_fewer_calls() {
    let mut calls = 0;
    let mut cache = PreorderCache::new();
    let mut compare = |a: &u32, b: &u32| -> Result<bool, Infallible> {
        calls += 1;
        Ok(a <= b)
    };

    assert_eq!(cache.test(&1, &2, &mut compare), Ok(true));
    assert_eq!(cache.test(&2, &3, &mut compare), Ok(true));
    assert_eq!(cache.test(&1, &3, &mut compare), Ok(true));
    assert!(calls < 3);
}

#[test]
fn known_neighbours_grow_with_the_chain() {
    let mut cache = PreorderCache::new();
    for (a, b) in [(1u32, 2u32), (2, 4), (4, 8)] {
        cache.test(&a, &b, divides).unwrap();
    }
    let mut above_one: Vec<u32> = cache.known_successors(&1).copied().collect();
    above_one.sort_unstable();
    assert_eq!(above_one, vec![1, 2, 4, 8]);

    let mut below_eight: Vec<u32> = cache.known_predecessors(&8).copied().collect();
    below_eight.sort_unstable();
    assert_eq!(below_eight, vec![1, 2, 4, 8]);
}
