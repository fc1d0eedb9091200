//! The acceptability test a diagnosis search is driven by.
//!
//! An oracle looks at the current contents of a working set and answers
//! whether it is acceptable (consistent, in the knowledge base case). It must
//! be a pure function of those contents. Rejection is an answer, not an error:
//! `Err` is reserved for candidates the oracle could not decide at all.
//!
//! The diagnosis engine additionally assumes that acceptance is closed under
//! subsets: if a set of statements is accepted, so is every subset of it.
//! An oracle that breaks this gets incomplete or non-minimal results, never a
//! crash.

use std::collections::BTreeSet;
use std::marker::PhantomData;

use crate::error::OracleError;
use crate::set_of_sets::SetOfSets;
use crate::working_set::WorkingSet;

pub trait Oracle<W> {
    /// Decide whether `candidate` is acceptable.
    fn accept(&mut self, candidate: &W) -> Result<bool, OracleError>;
}

impl<W, O: Oracle<W> + ?Sized> Oracle<W> for &mut O {
    fn accept(&mut self, candidate: &W) -> Result<bool, OracleError> {
        (**self).accept(candidate)
    }
}

impl<W, O: Oracle<W> + ?Sized> Oracle<W> for Box<O> {
    fn accept(&mut self, candidate: &W) -> Result<bool, OracleError> {
        (**self).accept(candidate)
    }
}

// ---------------------------------------------------------------------------
// Closure oracles
// ---------------------------------------------------------------------------

/// An oracle backed by a closure. Build one with [`from_fn`].
pub struct FnOracle<W, F> {
    func: F,
    _candidate: PhantomData<fn(&W)>,
}

/// Use a closure as an oracle.
///
/// ```
/// use std::collections::BTreeSet;
/// use akh_diag::oracle::{from_fn, Oracle};
///
/// let mut small = from_fn(|ws: &BTreeSet<u32>| Ok(ws.len() < 3));
/// assert!(small.accept(&BTreeSet::from([1, 2])).unwrap());
/// ```
pub fn from_fn<W, F>(func: F) -> FnOracle<W, F>
where
    F: FnMut(&W) -> Result<bool, OracleError>,
{
    FnOracle {
        func,
        _candidate: PhantomData,
    }
}

impl<W, F> Oracle<W> for FnOracle<W, F>
where
    F: FnMut(&W) -> Result<bool, OracleError>,
{
    fn accept(&mut self, candidate: &W) -> Result<bool, OracleError> {
        (self.func)(candidate)
    }
}

// ---------------------------------------------------------------------------
// Conflict oracle
// ---------------------------------------------------------------------------

/// Oracle for knowledge bases described by their minimal conflicts.
///
/// A candidate is rejected iff it contains every element of some conflict
/// ("nogood"). Acceptance is closed under subsets by construction. The
/// conflicts live in a [`SetOfSets`], so each test is one `contains_subset`
/// walk over the trie.
#[derive(Debug, Clone)]
pub struct ConflictOracle<E> {
    conflicts: SetOfSets<E>,
}

impl<E: Ord> Default for ConflictOracle<E> {
    fn default() -> Self {
        Self {
            conflicts: SetOfSets::new(),
        }
    }
}

impl<E: Ord> ConflictOracle<E> {
    pub fn new<I>(conflicts: I) -> Self
    where
        I: IntoIterator<Item = BTreeSet<E>>,
    {
        Self {
            conflicts: conflicts.into_iter().collect(),
        }
    }

    /// Declare another conflict. Returns `false` if it was already known.
    pub fn add_conflict(&mut self, conflict: BTreeSet<E>) -> bool {
        self.conflicts.insert(conflict)
    }

    pub fn conflicts(&self) -> &SetOfSets<E> {
        &self.conflicts
    }

    /// Pure check on a set of statements, without going through a working set.
    pub fn is_consistent(&self, statements: &BTreeSet<E>) -> bool {
        !self.conflicts.contains_subset(statements)
    }
}

impl<E: Ord, W: WorkingSet<E>> Oracle<W> for ConflictOracle<E> {
    fn accept(&mut self, candidate: &W) -> Result<bool, OracleError> {
        Ok(self.is_consistent(&candidate.contents()))
    }
}
