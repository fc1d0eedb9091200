//! Trie-backed map keyed by finite sets, with subset and superset queries.
//!
//! A key set is canonicalized by sorting its elements; the trie path from the
//! root spells that sorted sequence and the node at its end carries the value.
//! Every node tracks how many stored keys live in its subtree, so `len()` and
//! "is anything stored below here" are O(1).
//!
//! Subset queries prune a whole subtree the moment a child's element is absent
//! from the query. Superset queries walk the query in sorted order and only
//! follow children that sort at or before the next unmatched query element,
//! since a stored key may carry extra elements between the ones it shares with
//! the query.

use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Trie node
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Node<K, V> {
    /// Payload of the key whose sorted path ends here.
    value: Option<V>,
    /// Outgoing edges, labeled by the next element of the sorted key.
    children: BTreeMap<K, Node<K, V>>,
    /// Number of stored keys in this subtree, this node included.
    len: usize,
}

impl<K: Ord, V> Node<K, V> {
    fn new() -> Self {
        Self {
            value: None,
            children: BTreeMap::new(),
            len: 0,
        }
    }

    fn get(&self, path: &[&K]) -> Option<&V> {
        match path.split_first() {
            None => self.value.as_ref(),
            Some((head, rest)) => self.children.get(*head)?.get(rest),
        }
    }

    fn get_mut(&mut self, path: &[&K]) -> Option<&mut V> {
        match path.split_first() {
            None => self.value.as_mut(),
            Some((head, rest)) => self.children.get_mut(*head)?.get_mut(rest),
        }
    }

    fn insert(&mut self, mut path: impl Iterator<Item = K>, value: V) -> Option<V> {
        let previous = match path.next() {
            None => self.value.replace(value),
            Some(head) => self
                .children
                .entry(head)
                .or_insert_with(Node::new)
                .insert(path, value),
        };
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    fn remove(&mut self, path: &[&K]) -> Option<V> {
        let removed = match path.split_first() {
            None => self.value.take(),
            Some((head, rest)) => {
                let child = self.children.get_mut(*head)?;
                let removed = child.remove(rest);
                if child.len == 0 {
                    self.children.remove(*head);
                }
                removed
            }
        };
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Is some key stored in this subtree a subset of `query`?
    ///
    /// `query` holds only the elements that may still extend the current path,
    /// i.e. those sorting after the last matched element.
    fn any_subset(&self, query: &[&K]) -> bool {
        if self.value.is_some() {
            return true;
        }
        if self.children.len() < query.len() {
            self.children.iter().any(|(key, child)| {
                query
                    .binary_search_by(|probe| (*probe).cmp(key))
                    .is_ok_and(|pos| child.any_subset(&query[pos + 1..]))
            })
        } else {
            query.iter().enumerate().any(|(pos, element)| {
                self.children
                    .get(*element)
                    .is_some_and(|child| child.any_subset(&query[pos + 1..]))
            })
        }
    }

    /// Is some key stored in this subtree a superset of `query`?
    ///
    /// `query` holds the elements not matched yet along the current path.
    fn any_superset(&self, query: &[&K]) -> bool {
        let Some((next, rest)) = query.split_first() else {
            return self.len > 0;
        };
        self.children
            .range::<K, _>(..=*next)
            .any(|(key, child)| {
                if key == *next {
                    child.any_superset(rest)
                } else {
                    child.any_superset(query)
                }
            })
    }

    fn collect_all<'a>(&'a self, prefix: &mut Vec<&'a K>, out: &mut Vec<(BTreeSet<K>, &'a V)>)
    where
        K: Clone,
    {
        if let Some(value) = &self.value {
            out.push((prefix.iter().map(|k| (*k).clone()).collect(), value));
        }
        for (key, child) in &self.children {
            prefix.push(key);
            child.collect_all(prefix, out);
            prefix.pop();
        }
    }

    fn collect_subsets<'a>(
        &'a self,
        prefix: &mut Vec<&'a K>,
        query: &[&K],
        out: &mut Vec<(BTreeSet<K>, &'a V)>,
    ) where
        K: Clone,
    {
        if let Some(value) = &self.value {
            out.push((prefix.iter().map(|k| (*k).clone()).collect(), value));
        }
        for (pos, element) in query.iter().enumerate() {
            if let Some((key, child)) = self.children.get_key_value(*element) {
                prefix.push(key);
                child.collect_subsets(prefix, &query[pos + 1..], out);
                prefix.pop();
            }
        }
    }

    fn collect_supersets<'a>(
        &'a self,
        prefix: &mut Vec<&'a K>,
        query: &[&K],
        out: &mut Vec<(BTreeSet<K>, &'a V)>,
    ) where
        K: Clone,
    {
        let Some((next, rest)) = query.split_first() else {
            self.collect_all(prefix, out);
            return;
        };
        for (key, child) in self.children.range::<K, _>(..=*next) {
            prefix.push(key);
            if key == *next {
                child.collect_supersets(prefix, rest, out);
            } else {
                child.collect_supersets(prefix, query, out);
            }
            prefix.pop();
        }
    }
}

// ---------------------------------------------------------------------------
// Subset index
// ---------------------------------------------------------------------------

/// Associative container keyed by finite sets of ordered elements.
///
/// Keys compare by membership: `{1, 2}` and `{2, 1}` are the same key. The
/// empty set is a valid key and lives at the root.
#[derive(Debug, Clone)]
pub struct SubsetIndex<K, V> {
    root: Node<K, V>,
}

impl<K: Ord, V> Default for SubsetIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> SubsetIndex<K, V> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self { root: Node::new() }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.root.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.len == 0
    }

    /// Drop every stored key.
    pub fn clear(&mut self) {
        self.root = Node::new();
    }

    /// Look up the value stored under exactly this key set.
    pub fn get(&self, key: &BTreeSet<K>) -> Option<&V> {
        self.root.get(&sorted(key))
    }

    pub fn get_mut(&mut self, key: &BTreeSet<K>) -> Option<&mut V> {
        self.root.get_mut(&sorted(key))
    }

    pub fn contains_key(&self, key: &BTreeSet<K>) -> bool {
        self.get(key).is_some()
    }

    /// Store `value` under `key`, returning the value it replaces.
    pub fn insert(&mut self, key: BTreeSet<K>, value: V) -> Option<V> {
        self.root.insert(key.into_iter(), value)
    }

    /// Remove `key`, returning its value. Empty branches are pruned.
    pub fn remove(&mut self, key: &BTreeSet<K>) -> Option<V> {
        self.root.remove(&sorted(key))
    }

    /// True iff some stored key is a subset of `query`.
    ///
    /// For an empty query this asks whether the empty set is stored.
    pub fn contains_subset(&self, query: &BTreeSet<K>) -> bool {
        self.root.any_subset(&sorted(query))
    }

    /// True iff some stored key is a superset of `query`.
    ///
    /// For an empty query this asks whether anything is stored.
    pub fn contains_superset(&self, query: &BTreeSet<K>) -> bool {
        self.root.any_superset(&sorted(query))
    }

    /// All entries whose key is a subset of `query`, in key order.
    pub fn subsets_of(&self, query: &BTreeSet<K>) -> Vec<(BTreeSet<K>, &V)>
    where
        K: Clone,
    {
        let mut out = Vec::new();
        self.root
            .collect_subsets(&mut Vec::new(), &sorted(query), &mut out);
        out
    }

    /// All entries whose key is a superset of `query`, in key order.
    pub fn supersets_of(&self, query: &BTreeSet<K>) -> Vec<(BTreeSet<K>, &V)>
    where
        K: Clone,
    {
        let mut out = Vec::new();
        self.root
            .collect_supersets(&mut Vec::new(), &sorted(query), &mut out);
        out
    }

    /// Iterate over all entries in lexicographic order of their sorted keys.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            stack: vec![(Vec::new(), &self.root)],
            remaining: self.root.len,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = BTreeSet<K>> + '_
    where
        K: Clone,
    {
        self.iter().map(|(key, _)| key)
    }
}

impl<K: Ord, V> FromIterator<(BTreeSet<K>, V)> for SubsetIndex<K, V> {
    fn from_iter<I: IntoIterator<Item = (BTreeSet<K>, V)>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

impl<K: Ord, V> Extend<(BTreeSet<K>, V)> for SubsetIndex<K, V> {
    fn extend<I: IntoIterator<Item = (BTreeSet<K>, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K: Ord + Clone, V> IntoIterator for &'a SubsetIndex<K, V> {
    type Item = (BTreeSet<K>, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over the entries of a [`SubsetIndex`].
///
/// Walks the trie depth-first with an explicit stack, so the path to the
/// current node is rebuilt only for data-bearing nodes.
pub struct Iter<'a, K, V> {
    stack: Vec<(Vec<&'a K>, &'a Node<K, V>)>,
    remaining: usize,
}

impl<'a, K: Ord + Clone, V> Iterator for Iter<'a, K, V> {
    type Item = (BTreeSet<K>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((path, node)) = self.stack.pop() {
            for (key, child) in node.children.iter().rev() {
                let mut child_path = path.clone();
                child_path.push(key);
                self.stack.push((child_path, child));
            }
            if let Some(value) = &node.value {
                self.remaining -= 1;
                return Some((path.into_iter().cloned().collect(), value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Ord + Clone, V> ExactSizeIterator for Iter<'_, K, V> {}

fn sorted<K>(set: &BTreeSet<K>) -> Vec<&K> {
    set.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(elements: &[u32]) -> BTreeSet<u32> {
        elements.iter().copied().collect()
    }

    fn sample() -> SubsetIndex<u32, &'static str> {
        let mut index = SubsetIndex::new();
        index.insert(set(&[2]), "two");
        index.insert(set(&[1, 3]), "one-three");
        index.insert(set(&[1, 4, 5, 6]), "one-four-five-six");
        index
    }

    #[test]
    fn insert_get_remove() {
        let mut index = sample();
        assert_eq!(index.len(), 3);
        assert_eq!(index.get(&set(&[3, 1])), Some(&"one-three"));
        assert_eq!(index.get(&set(&[1])), None);

        assert_eq!(index.insert(set(&[3, 1]), "replaced"), Some("one-three"));
        assert_eq!(index.len(), 3);

        assert_eq!(index.remove(&set(&[1, 3])), Some("replaced"));
        assert_eq!(index.remove(&set(&[1, 3])), None);
        assert_eq!(index.len(), 2);
        assert!(!index.contains_key(&set(&[1, 3])));
        assert!(index.contains_key(&set(&[6, 5, 4, 1])));
    }

    #[test]
    fn remove_prefix_keeps_longer_key() {
        let mut index = SubsetIndex::new();
        index.insert(set(&[1]), 1);
        index.insert(set(&[1, 2]), 12);
        assert_eq!(index.remove(&set(&[1])), Some(1));
        assert_eq!(index.get(&set(&[1, 2])), Some(&12));
        assert_eq!(index.len(), 1);
        assert_eq!(index.remove(&set(&[1, 2])), Some(12));
        assert!(index.is_empty());
        assert!(index.root.children.is_empty());
    }

    #[test]
    fn contains_subset_matches_example() {
        let index = sample();
        assert!(index.contains_subset(&set(&[1, 4, 5, 6, 3])));
        assert!(!index.contains_subset(&set(&[1, 4, 5])));
        assert!(index.contains_subset(&set(&[2, 9])));
        assert!(!index.contains_subset(&set(&[])));
    }

    #[test]
    fn contains_superset_skips_extra_elements() {
        let index = sample();
        assert!(index.contains_superset(&set(&[4, 6])));
        assert!(index.contains_superset(&set(&[1])));
        assert!(index.contains_superset(&set(&[3])));
        assert!(!index.contains_superset(&set(&[2, 3])));
        assert!(!index.contains_superset(&set(&[7])));
        assert!(index.contains_superset(&set(&[])));
    }

    #[test]
    fn empty_key_lives_at_root() {
        let mut index: SubsetIndex<u32, ()> = SubsetIndex::new();
        assert!(!index.contains_superset(&set(&[])));
        index.insert(set(&[]), ());
        assert!(index.contains_subset(&set(&[])));
        assert!(index.contains_subset(&set(&[8])));
        assert!(index.contains_key(&set(&[])));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn collecting_queries_return_all_matches() {
        let index = sample();
        let subsets: Vec<_> = index
            .subsets_of(&set(&[1, 2, 3, 4, 5, 6]))
            .into_iter()
            .map(|(key, value)| (key, *value))
            .collect();
        assert_eq!(
            subsets,
            vec![
                (set(&[1, 3]), "one-three"),
                (set(&[1, 4, 5, 6]), "one-four-five-six"),
                (set(&[2]), "two"),
            ]
        );

        let supersets: Vec<_> = index.supersets_of(&set(&[1])).into_iter().map(|(k, _)| k).collect();
        assert_eq!(supersets, vec![set(&[1, 3]), set(&[1, 4, 5, 6])]);
        assert_eq!(index.supersets_of(&set(&[])).len(), 3);
    }

    #[test]
    fn iteration_is_sorted_and_exact() {
        let index = sample();
        let iter = index.iter();
        assert_eq!(iter.len(), 3);
        let keys: Vec<_> = index.keys().collect();
        assert_eq!(keys, vec![set(&[1, 3]), set(&[1, 4, 5, 6]), set(&[2])]);
    }

    #[test]
    fn repeated_queries_are_stable() {
        let index = sample();
        let query = set(&[1, 3, 4]);
        let first = (index.contains_subset(&query), index.contains_superset(&query));
        for _ in 0..5 {
            assert_eq!(
                (index.contains_subset(&query), index.contains_superset(&query)),
                first
            );
        }
    }

    #[test]
    fn clear_resets_everything() {
        let mut index = sample();
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.iter().count(), 0);
        assert!(!index.contains_superset(&set(&[])));
    }
}
