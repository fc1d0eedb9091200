//! Branch-and-bound enumeration of minimal correction sets.
//!
//! Generalizes Malouf's maximal consistent subsets search. Given an ordered
//! universe of statements inside a working set and an oracle deciding
//! acceptability, the [`Diagnosis`] engine lazily yields every minimal
//! correction set: a set of statements whose removal makes the working set
//! acceptable, with no proper subset doing the same. The complement of each
//! one is a maximal acceptable subset.
//!
//! ## Search
//!
//! Pending states are `(boundary, removed)` pairs kept in a FIFO queue, so
//! states are visited in order of increasing `removed` size. A state is
//!
//! 1. discarded if some correction set already found is a subset of `removed`,
//! 2. emitted if the working set minus `removed` is accepted,
//! 3. otherwise expanded into one child per universe index `i >= boundary`,
//!    each removing `universe[i]` on top of `removed`.
//!
//! Expansion walks a probe that keeps `universe[boundary..=i]` and drops every
//! later element. Once the probe is rejected, every later sibling keeps at
//! least those statements and can never be accepted, so expansion stops.
//!
//! ## Precondition
//!
//! Acceptance must be closed under subsets: dropping statements from an
//! accepted set keeps it accepted. Both the pruning in step 1 and the early
//! stop depend on it. Other oracles get incomplete or non-minimal results.

use std::collections::{BTreeSet, VecDeque};
use std::fmt::Debug;
use std::iter::{self, FusedIterator};

use serde::{Deserialize, Serialize};

use crate::error::{DiagResult, SearchError};
use crate::oracle::Oracle;
use crate::set_of_sets::SetOfSets;
use crate::working_set::WorkingSet;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a diagnosis search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosisConfig {
    /// Only yield correction sets of globally minimum size (default: false).
    pub largest_only: bool,
    /// Stop after this many correction sets (default: unlimited).
    pub max_results: Option<usize>,
    /// Test the working set with the whole universe removed before searching,
    /// and yield nothing if even that is rejected (default: true).
    pub check_core: bool,
}

impl Default for DiagnosisConfig {
    fn default() -> Self {
        Self {
            largest_only: false,
            max_results: None,
            check_core: true,
        }
    }
}

/// Running counters for a diagnosis search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Oracle calls made so far.
    pub oracle_calls: usize,
    /// Rejected states that were branched.
    pub expanded: usize,
    /// States discarded as supersets of a found correction set.
    pub pruned: usize,
    /// Correction sets yielded.
    pub found: usize,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct QueueItem<E> {
    /// Universe indices below this are fixed for all descendants.
    boundary: usize,
    removed: BTreeSet<E>,
}

/// Lazy enumerator of minimal correction sets.
///
/// Pull results with [`next_correction`](Self::next_correction) or through
/// the `Iterator` impl. Callers may stop pulling at any point; the engine
/// holds no resources besides its queue. Once it returns `None` or an error
/// it stays exhausted; start over with a fresh engine.
pub struct Diagnosis<E, W, O> {
    universe: Vec<E>,
    working_set: W,
    oracle: O,
    config: DiagnosisConfig,
    queue: VecDeque<QueueItem<E>>,
    found: SetOfSets<E>,
    /// Size of the first correction set found, the global minimum.
    smallest: Option<usize>,
    core_checked: bool,
    exhausted: bool,
    stats: SearchStats,
}

impl<E, W, O> Diagnosis<E, W, O>
where
    E: Ord + Clone + Debug,
    W: WorkingSet<E>,
    O: Oracle<W>,
{
    /// Set up a search over `universe`, which must be duplicate-free.
    ///
    /// `working_set` holds the universe plus any statements that are never
    /// removed. Universe order only affects the order of results.
    pub fn new(
        universe: Vec<E>,
        working_set: W,
        oracle: O,
        config: DiagnosisConfig,
    ) -> DiagResult<Self> {
        let mut seen = BTreeSet::new();
        for element in &universe {
            if !seen.insert(element) {
                return Err(SearchError::DuplicateElement {
                    element: format!("{element:?}"),
                }
                .into());
            }
        }

        let mut queue = VecDeque::new();
        queue.push_back(QueueItem {
            boundary: 0,
            removed: BTreeSet::new(),
        });

        Ok(Self {
            universe,
            working_set,
            oracle,
            config,
            queue,
            found: SetOfSets::new(),
            smallest: None,
            core_checked: false,
            exhausted: false,
            stats: SearchStats::default(),
        })
    }

    pub fn universe(&self) -> &[E] {
        &self.universe
    }

    pub fn config(&self) -> &DiagnosisConfig {
        &self.config
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Every correction set yielded so far.
    pub fn found(&self) -> &SetOfSets<E> {
        &self.found
    }

    /// Run the search until the next minimal correction set.
    ///
    /// `Ok(None)` means the search is over. An oracle error aborts the
    /// current step and leaves the engine exhausted.
    pub fn next_correction(&mut self) -> DiagResult<Option<BTreeSet<E>>> {
        if self.exhausted {
            return Ok(None);
        }
        let next = self.search();
        if !matches!(next, Ok(Some(_))) {
            self.exhausted = true;
        }
        next
    }

    /// Yield maximal acceptable subsets instead of correction sets.
    pub fn maximal_subsets(self) -> MaximalSubsets<E, W, O> {
        MaximalSubsets {
            everything: self.working_set.contents(),
            inner: self,
        }
    }

    fn search(&mut self) -> DiagResult<Option<BTreeSet<E>>> {
        if self
            .config
            .max_results
            .is_some_and(|max| self.stats.found >= max)
        {
            tracing::debug!(found = self.stats.found, "diagnosis: result limit reached");
            return Ok(None);
        }

        if !self.core_checked {
            self.core_checked = true;
            if self.config.check_core && !self.core_accepted()? {
                tracing::warn!(
                    universe = self.universe.len(),
                    "diagnosis: working set is rejected even with the whole universe removed"
                );
                return Ok(None);
            }
        }

        while let Some(item) = self.queue.pop_front() {
            if self.config.largest_only
                && self.smallest.is_some_and(|size| item.removed.len() > size)
            {
                tracing::debug!(
                    size = self.smallest,
                    found = self.stats.found,
                    oracle_calls = self.stats.oracle_calls,
                    "diagnosis: all minimum-size correction sets found"
                );
                self.queue.clear();
                return Ok(None);
            }

            if self.found.contains_subset(&item.removed) {
                self.stats.pruned += 1;
                tracing::trace!(removed = ?item.removed, "diagnosis: pruned superset of a found correction set");
                continue;
            }

            let mut candidate = self.working_set.clone();
            candidate.remove_all(&item.removed);
            if self.ask(&candidate)? {
                self.found.insert(item.removed.clone());
                self.stats.found += 1;
                if self.smallest.is_none() {
                    self.smallest = Some(item.removed.len());
                }
                tracing::debug!(
                    removed = ?item.removed,
                    oracle_calls = self.stats.oracle_calls,
                    "diagnosis: correction set found"
                );
                return Ok(Some(item.removed));
            }

            self.expand(item, candidate)?;
        }

        tracing::debug!(
            found = self.stats.found,
            expanded = self.stats.expanded,
            pruned = self.stats.pruned,
            oracle_calls = self.stats.oracle_calls,
            "diagnosis: search exhausted"
        );
        Ok(None)
    }

    /// Branch a rejected state. `probe` arrives as the working set minus
    /// `item.removed`.
    fn expand(&mut self, item: QueueItem<E>, mut probe: W) -> DiagResult<()> {
        self.stats.expanded += 1;
        let QueueItem { boundary, removed } = item;
        let end = self.universe.len();

        probe.remove_all(&self.universe[boundary..]);
        for i in boundary..end {
            let element = self.universe[i].clone();
            let mut child = removed.clone();
            child.insert(element.clone());
            self.queue.push_back(QueueItem {
                boundary: i + 1,
                removed: child,
            });

            if i + 1 == end {
                break;
            }
            probe.add_all(iter::once(&element));
            if !self.ask(&probe)? {
                tracing::trace!(
                    boundary,
                    kept_through = i,
                    "diagnosis: probe rejected, later siblings cut"
                );
                break;
            }
        }
        Ok(())
    }

    fn core_accepted(&mut self) -> DiagResult<bool> {
        let mut core = self.working_set.clone();
        core.remove_all(&self.universe);
        self.ask(&core)
    }

    fn ask(&mut self, candidate: &W) -> DiagResult<bool> {
        self.stats.oracle_calls += 1;
        let accepted = self.oracle.accept(candidate)?;
        tracing::trace!(accepted, call = self.stats.oracle_calls, "diagnosis: oracle consulted");
        Ok(accepted)
    }
}

impl<E, W, O> Iterator for Diagnosis<E, W, O>
where
    E: Ord + Clone + Debug,
    W: WorkingSet<E>,
    O: Oracle<W>,
{
    type Item = DiagResult<BTreeSet<E>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_correction().transpose()
    }
}

impl<E, W, O> FusedIterator for Diagnosis<E, W, O>
where
    E: Ord + Clone + Debug,
    W: WorkingSet<E>,
    O: Oracle<W>,
{
}

/// Lazy enumerator of maximal acceptable subsets.
///
/// Each item is the working set's contents minus one minimal correction set.
pub struct MaximalSubsets<E, W, O> {
    inner: Diagnosis<E, W, O>,
    everything: BTreeSet<E>,
}

impl<E, W, O> MaximalSubsets<E, W, O> {
    /// The underlying correction-set search.
    pub fn diagnosis(&self) -> &Diagnosis<E, W, O> {
        &self.inner
    }
}

impl<E, W, O> Iterator for MaximalSubsets<E, W, O>
where
    E: Ord + Clone + Debug,
    W: WorkingSet<E>,
    O: Oracle<W>,
{
    type Item = DiagResult<BTreeSet<E>>;

    fn next(&mut self) -> Option<Self::Item> {
        let removed = match self.inner.next()? {
            Ok(removed) => removed,
            Err(e) => return Some(Err(e)),
        };
        Some(Ok(self.everything.difference(&removed).cloned().collect()))
    }
}

impl<E, W, O> FusedIterator for MaximalSubsets<E, W, O>
where
    E: Ord + Clone + Debug,
    W: WorkingSet<E>,
    O: Oracle<W>,
{
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// All minimal correction sets of `universe`, working on a plain set.
pub fn correction_sets<E, O>(
    universe: Vec<E>,
    oracle: O,
) -> DiagResult<Diagnosis<E, BTreeSet<E>, O>>
where
    E: Ord + Clone + Debug,
    O: Oracle<BTreeSet<E>>,
{
    let working_set: BTreeSet<E> = universe.iter().cloned().collect();
    Diagnosis::new(universe, working_set, oracle, DiagnosisConfig::default())
}

/// Maximal acceptable subsets of `universe` that keep every `required` element.
///
/// Required elements stay in the working set and never enter the search.
/// `limit` caps the number of subsets produced.
pub fn maximal_subsets_containing<E, O>(
    universe: Vec<E>,
    required: &BTreeSet<E>,
    oracle: O,
    limit: Option<usize>,
) -> DiagResult<MaximalSubsets<E, BTreeSet<E>, O>>
where
    E: Ord + Clone + Debug,
    O: Oracle<BTreeSet<E>>,
{
    let working_set: BTreeSet<E> = universe.iter().cloned().collect();
    if let Some(missing) = required.difference(&working_set).next() {
        return Err(SearchError::UnknownRequired {
            element: format!("{missing:?}"),
        }
        .into());
    }

    let searchable = universe
        .into_iter()
        .filter(|element| !required.contains(element))
        .collect();
    let config = DiagnosisConfig {
        max_results: limit,
        ..Default::default()
    };
    Ok(Diagnosis::new(searchable, working_set, oracle, config)?.maximal_subsets())
}

/// A single correction set of globally minimum size, if any exists.
pub fn smallest_correction_set<E, O>(universe: Vec<E>, oracle: O) -> DiagResult<Option<BTreeSet<E>>>
where
    E: Ord + Clone + Debug,
    O: Oracle<BTreeSet<E>>,
{
    let working_set: BTreeSet<E> = universe.iter().cloned().collect();
    let config = DiagnosisConfig {
        largest_only: true,
        max_results: Some(1),
        ..Default::default()
    };
    Diagnosis::new(universe, working_set, oracle, config)?.next_correction()
}

/// Shrink a rejected working set to a minimal rejected subset.
///
/// Tries dropping each element of `order` in turn and puts it back whenever
/// the rest becomes acceptable. Elements of `candidate` not listed in `order`
/// are never dropped. Returns `None` if `candidate` is accepted as given.
///
/// This is a linear scan with one oracle call per listed element, the dual of
/// the correction-set search rather than a configuration of it.
pub fn minimal_unacceptable_subset<E, W, O>(
    mut candidate: W,
    order: &[E],
    mut oracle: O,
) -> DiagResult<Option<BTreeSet<E>>>
where
    E: Ord + Clone + Debug,
    W: WorkingSet<E>,
    O: Oracle<W>,
{
    if oracle.accept(&candidate)? {
        return Ok(None);
    }

    let mut oracle_calls = 1;
    for element in order {
        candidate.remove_all(iter::once(element));
        oracle_calls += 1;
        if oracle.accept(&candidate)? {
            candidate.add_all(iter::once(element));
        }
    }

    let conflict = candidate.contents();
    tracing::debug!(size = conflict.len(), oracle_calls, "diagnosis: minimal conflict isolated");
    Ok(Some(conflict))
}
