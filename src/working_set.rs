//! The mutable collection of statements a diagnosis search edits.
//!
//! The engine never looks inside a knowledge base beyond these operations: it
//! clones the base, removes or re-adds statements, and hands the copy to the
//! oracle. Plain sets implement the trait; richer knowledge bases (with
//! reasoner state attached) implement it by forwarding to their statement
//! store.

use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;

pub trait WorkingSet<E>: Clone {
    /// Remove every listed element that is present.
    fn remove_all<'a, I>(&mut self, elements: I)
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a;

    /// Add every listed element that is absent.
    fn add_all<'a, I>(&mut self, elements: I)
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a;

    /// Snapshot of the current statements.
    fn contents(&self) -> BTreeSet<E>;
}

impl<E: Ord + Clone> WorkingSet<E> for BTreeSet<E> {
    fn remove_all<'a, I>(&mut self, elements: I)
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        for element in elements {
            self.remove(element);
        }
    }

    fn add_all<'a, I>(&mut self, elements: I)
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        self.extend(elements.into_iter().cloned());
    }

    fn contents(&self) -> BTreeSet<E> {
        self.clone()
    }
}

impl<E: Ord + Hash + Clone> WorkingSet<E> for HashSet<E> {
    fn remove_all<'a, I>(&mut self, elements: I)
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        for element in elements {
            self.remove(element);
        }
    }

    fn add_all<'a, I>(&mut self, elements: I)
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        self.extend(elements.into_iter().cloned());
    }

    fn contents(&self) -> BTreeSet<E> {
        self.iter().cloned().collect()
    }
}
