//! Memoization for expensive preorder oracles.
//!
//! A preorder is reflexive and transitive. Each time the oracle answers a
//! question `pred ≤ succ`, the cache records the answer and closes it under
//! transitivity against what is already known:
//!
//! - `pred ≤ succ` holds: every known `p ≤ pred` and `succ ≤ s` give `p ≤ s`.
//! - `pred ≤ succ` fails: every known `pred ≤ s` and `p ≤ succ` give `s ≰ p`,
//!   because `pred ≤ s ≤ p ≤ succ` would contradict the observation.
//!
//! Only facts that follow from the observations are recorded, so a cached
//! answer is always the oracle's answer. The oracle is called only after a
//! cache miss, and nothing is recorded when it fails.
//!
//! Used for subsumption-style checks where asking the reasoner costs far more
//! than a hash lookup.

use std::collections::HashMap;
use std::hash::Hash;

/// Known facts of a preorder, indexed from both ends.
#[derive(Debug, Clone)]
pub struct PreorderCache<T> {
    /// `x → {y → (x ≤ y)}`
    successors: HashMap<T, HashMap<T, bool>>,
    /// `y → {x → (x ≤ y)}`
    predecessors: HashMap<T, HashMap<T, bool>>,
}

impl<T: Eq + Hash + Clone> Default for PreorderCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> PreorderCache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            successors: HashMap::new(),
            predecessors: HashMap::new(),
        }
    }

    /// Number of cached `(pred, succ)` facts, reflexive seeds included.
    pub fn len(&self) -> usize {
        self.successors.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    pub fn clear(&mut self) {
        self.successors.clear();
        self.predecessors.clear();
    }

    /// The cached answer for `pred ≤ succ`, if any.
    pub fn get(&self, pred: &T, succ: &T) -> Option<bool> {
        if pred == succ {
            return Some(true);
        }
        self.successors.get(pred)?.get(succ).copied()
    }

    /// True iff `pred ≤ succ` is known to hold. Never calls an oracle.
    pub fn is_known_successor(&self, pred: &T, succ: &T) -> bool {
        self.get(pred, succ) == Some(true)
    }

    /// True unless `pred ≤ succ` is known to fail. Never calls an oracle.
    ///
    /// Lets callers discard candidates cheaply before paying for a real test.
    pub fn is_possible_successor(&self, pred: &T, succ: &T) -> bool {
        self.get(pred, succ) != Some(false)
    }

    /// Every element known to sit above `pred`, `pred` itself included if observed.
    pub fn known_successors<'a>(&'a self, pred: &'a T) -> impl Iterator<Item = &'a T> + 'a {
        self.successors
            .get(pred)
            .into_iter()
            .flat_map(|succs| succs.iter().filter(|(_, holds)| **holds).map(|(s, _)| s))
    }

    /// Every element known to sit below `succ`, `succ` itself included if observed.
    pub fn known_predecessors<'a>(&'a self, succ: &'a T) -> impl Iterator<Item = &'a T> + 'a {
        self.predecessors
            .get(succ)
            .into_iter()
            .flat_map(|preds| preds.iter().filter(|(_, holds)| **holds).map(|(p, _)| p))
    }

    /// Answer `pred ≤ succ`, calling `oracle` only on a cache miss.
    ///
    /// Oracle errors are returned untouched and leave the cache unchanged.
    pub fn test<E, F>(&mut self, pred: &T, succ: &T, oracle: F) -> Result<bool, E>
    where
        F: FnOnce(&T, &T) -> Result<bool, E>,
    {
        if let Some(holds) = self.get(pred, succ) {
            return Ok(holds);
        }
        let holds = oracle(pred, succ)?;
        self.record(pred, succ, holds);
        Ok(holds)
    }

    /// Record an observed fact and propagate its transitive consequences.
    pub fn record(&mut self, pred: &T, succ: &T, holds: bool) {
        self.seed(pred);
        self.seed(succ);

        if holds {
            let lower: Vec<T> = self.known_predecessors(pred).cloned().collect();
            let upper: Vec<T> = self.known_successors(succ).cloned().collect();
            for p in &lower {
                for s in &upper {
                    self.insert(p, s, true);
                }
            }
        } else {
            let upper: Vec<T> = self.known_successors(pred).cloned().collect();
            let lower: Vec<T> = self.known_predecessors(succ).cloned().collect();
            for s in &upper {
                for p in &lower {
                    self.insert(s, p, false);
                }
            }
        }
        tracing::trace!(holds, cached = self.len(), "preorder fact recorded");
    }

    /// Lazily add the reflexive fact `x ≤ x`.
    fn seed(&mut self, x: &T) {
        if !self.successors.contains_key(x) {
            self.insert(x, x, true);
        }
    }

    /// First answer wins: a later contradicting fact means the oracle is not a
    /// preorder, and the cache keeps what the oracle said first.
    fn insert(&mut self, pred: &T, succ: &T, holds: bool) {
        let succs = self.successors.entry(pred.clone()).or_default();
        if succs.contains_key(succ) {
            return;
        }
        succs.insert(succ.clone(), holds);
        self.predecessors
            .entry(succ.clone())
            .or_default()
            .insert(pred.clone(), holds);
    }
}

// ---------------------------------------------------------------------------
// Wrapped oracle
// ---------------------------------------------------------------------------

/// A preorder oracle bundled with its own [`PreorderCache`].
///
/// Callers use it exactly like the bare oracle; repeated and transitively
/// implied questions never reach the oracle.
pub struct CachedPreorder<T, F> {
    cache: PreorderCache<T>,
    oracle: F,
    oracle_calls: usize,
}

/// Adapt a reflexive, transitive boolean relation into a memoized one.
pub fn wrap_preorder<T, F, E>(oracle: F) -> CachedPreorder<T, F>
where
    T: Eq + Hash + Clone,
    F: FnMut(&T, &T) -> Result<bool, E>,
{
    CachedPreorder {
        cache: PreorderCache::new(),
        oracle,
        oracle_calls: 0,
    }
}

impl<T, F, E> CachedPreorder<T, F>
where
    T: Eq + Hash + Clone,
    F: FnMut(&T, &T) -> Result<bool, E>,
{
    pub fn test(&mut self, pred: &T, succ: &T) -> Result<bool, E> {
        let oracle = &mut self.oracle;
        let calls = &mut self.oracle_calls;
        self.cache.test(pred, succ, |a, b| {
            *calls += 1;
            oracle(a, b)
        })
    }

    pub fn cache(&self) -> &PreorderCache<T> {
        &self.cache
    }

    /// How many questions actually reached the oracle.
    pub fn oracle_calls(&self) -> usize {
        self.oracle_calls
    }

    pub fn into_cache(self) -> PreorderCache<T> {
        self.cache
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;

    fn le(a: &u32, b: &u32) -> Result<bool, Infallible> {
        Ok(a <= b)
    }

    fn divides(a: &u32, b: &u32) -> Result<bool, Infallible> {
        Ok(b % a == 0)
    }

    #[test]
    fn transitive_chain_saves_an_oracle_call() {
        let mut calls = 0;
        let mut cache = PreorderCache::new();
        let mut counted = |a: &u32, b: &u32| {
            calls += 1;
            le(a, b)
        };

        assert_eq!(cache.test(&1, &2, &mut counted), Ok(true));
        assert_eq!(cache.test(&2, &3, &mut counted), Ok(true));
        assert!(cache.is_known_successor(&1, &3));
        assert_eq!(cache.test(&1, &3, &mut counted), Ok(true));
        assert_eq!(calls, 2);
    }

    #[test]
    fn reflexive_pairs_never_reach_the_oracle() {
        let mut cache: PreorderCache<u32> = PreorderCache::new();
        let answer: Result<bool, &str> = cache.test(&7, &7, |_, _| Err("should not be called"));
        assert_eq!(answer, Ok(true));
        assert!(cache.is_known_successor(&7, &7));
    }

    #[test]
    fn negative_fact_propagates_through_known_chains() {
        let mut cache = PreorderCache::new();
        cache.test(&4, &8, divides).unwrap();
        cache.test(&2, &4, divides).unwrap();
        assert!(cache.is_known_successor(&2, &8));

        assert_eq!(cache.test(&2, &3, divides), Ok(false));
        // 2 | 4 and 2 ∤ 3, so neither 4 nor 8 can divide 3.
        assert_eq!(cache.get(&4, &3), Some(false));
        assert_eq!(cache.get(&8, &3), Some(false));
        assert!(!cache.is_possible_successor(&8, &3));
        // Nothing is claimed about pairs the observations do not cover.
        assert!(cache.is_possible_successor(&3, &9));
        assert_eq!(cache.get(&3, &8), None);
    }

    #[test]
    fn oracle_error_leaves_cache_untouched() {
        let mut cache: PreorderCache<u32> = PreorderCache::new();
        let answer: Result<bool, &str> = cache.test(&1, &2, |_, _| Err("reasoner crashed"));
        assert_eq!(answer, Err("reasoner crashed"));
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1, &2), None);
    }

    #[test]
    fn wrapped_oracle_counts_real_calls() {
        let mut cached = wrap_preorder(le);
        for _ in 0..3 {
            assert_eq!(cached.test(&1, &5), Ok(true));
        }
        assert_eq!(cached.test(&5, &1), Ok(false));
        assert_eq!(cached.oracle_calls(), 2);
        assert_eq!(cached.cache().get(&5, &1), Some(false));
    }
}
