// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # akh-diag
//!
//! Diagnosis of inconsistent knowledge bases: enumerate the maximal
//! acceptable subsets of a set of statements (equivalently, the minimal
//! correction sets whose removal restores acceptability) and isolate minimal
//! unacceptable subsets, against an external and possibly expensive oracle.
//!
//! ## Architecture
//!
//! - **Subset index** (`subset_index`, `set_of_sets`): sorted tries keyed by
//!   finite sets, answering "is some stored set a subset/superset of this one"
//!   without scanning every stored set
//! - **Preorder cache** (`preorder`): memoizes a reflexive, transitive oracle
//!   and closes each answer under transitivity
//! - **Diagnosis engine** (`diagnosis`): lazy branch-and-bound search over
//!   correction sets, driving a `WorkingSet` and an `Oracle`
//!
//! ## Library usage
//!
//! ```
//! use std::collections::BTreeSet;
//! use akh_diag::diagnosis::correction_sets;
//! use akh_diag::oracle::ConflictOracle;
//!
//! // Statements 1 and 3 contradict each other.
//! let oracle = ConflictOracle::new([BTreeSet::from([1, 3])]);
//! let found: Vec<_> = correction_sets(vec![1, 2, 3], oracle)
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(found, vec![BTreeSet::from([1]), BTreeSet::from([3])]);
//! ```

pub mod diagnosis;
pub mod error;
pub mod oracle;
pub mod preorder;
pub mod set_of_sets;
pub mod subset_index;
pub mod working_set;
