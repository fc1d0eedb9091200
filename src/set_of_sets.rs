//! A family of finite sets with subset and superset membership queries.
//!
//! Thin unit-valued specialization of [`SubsetIndex`]. The diagnosis engine
//! keeps its found correction sets here, and [`ConflictOracle`] keeps its
//! nogoods here.
//!
//! [`ConflictOracle`]: crate::oracle::ConflictOracle

use std::collections::BTreeSet;

use crate::subset_index::SubsetIndex;

#[derive(Debug, Clone)]
pub struct SetOfSets<K> {
    index: SubsetIndex<K, ()>,
}

impl<K: Ord> Default for SetOfSets<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> SetOfSets<K> {
    pub fn new() -> Self {
        Self {
            index: SubsetIndex::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn clear(&mut self) {
        self.index.clear();
    }

    /// Add a set. Returns `false` if it was already present.
    pub fn insert(&mut self, set: BTreeSet<K>) -> bool {
        self.index.insert(set, ()).is_none()
    }

    /// Remove a set. Returns `false` if it was not present.
    pub fn remove(&mut self, set: &BTreeSet<K>) -> bool {
        self.index.remove(set).is_some()
    }

    pub fn contains(&self, set: &BTreeSet<K>) -> bool {
        self.index.contains_key(set)
    }

    /// True iff some member is a subset of `query`.
    pub fn contains_subset(&self, query: &BTreeSet<K>) -> bool {
        self.index.contains_subset(query)
    }

    /// True iff some member is a superset of `query`.
    pub fn contains_superset(&self, query: &BTreeSet<K>) -> bool {
        self.index.contains_superset(query)
    }

    pub fn subsets_of(&self, query: &BTreeSet<K>) -> Vec<BTreeSet<K>>
    where
        K: Clone,
    {
        self.index
            .subsets_of(query)
            .into_iter()
            .map(|(set, _)| set)
            .collect()
    }

    pub fn supersets_of(&self, query: &BTreeSet<K>) -> Vec<BTreeSet<K>>
    where
        K: Clone,
    {
        self.index
            .supersets_of(query)
            .into_iter()
            .map(|(set, _)| set)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = BTreeSet<K>> + '_
    where
        K: Clone,
    {
        self.index.keys()
    }
}

impl<K: Ord> FromIterator<BTreeSet<K>> for SetOfSets<K> {
    fn from_iter<I: IntoIterator<Item = BTreeSet<K>>>(iter: I) -> Self {
        let mut sets = Self::new();
        sets.extend(iter);
        sets
    }
}

impl<K: Ord> Extend<BTreeSet<K>> for SetOfSets<K> {
    fn extend<I: IntoIterator<Item = BTreeSet<K>>>(&mut self, iter: I) {
        for set in iter {
            self.insert(set);
        }
    }
}
