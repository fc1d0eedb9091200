//! Rich diagnostic error types for the diagnosis engine.
//!
//! Each concern defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. The data structures themselves
//! (`SubsetIndex`, `SetOfSets`, `PreorderCache`) are infallible: the only
//! failures come from the oracle or from a malformed search setup.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for diagnosis searches.
///
/// Each variant wraps a concern-specific error, preserving the full diagnostic
/// chain (error codes, help text, sources) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum DiagError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Search(#[from] SearchError),
}

// ---------------------------------------------------------------------------
// Oracle errors
// ---------------------------------------------------------------------------

/// Raised by an [`Oracle`](crate::oracle::Oracle) that could not decide a candidate.
///
/// Rejecting a candidate is never an error: an oracle answers `Ok(false)`.
#[derive(Debug, Error, Diagnostic)]
pub enum OracleError {
    #[error("oracle failed: {message}")]
    #[diagnostic(
        code(akh::diag::oracle_failed),
        help(
            "The acceptability test could not be evaluated for this candidate. \
             The search is left consistent but the failing step is lost; \
             discard the engine and start a fresh one once the oracle is fixed."
        )
    )]
    Failed { message: String },

    #[error("external reasoner error: {source}")]
    #[diagnostic(
        code(akh::diag::oracle_external),
        help("The reasoner backing the oracle raised an error. See the source for details.")
    )]
    External {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl OracleError {
    /// Wrap any reasoner error as an oracle failure.
    pub fn external(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::External {
            source: Box::new(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Search setup errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SearchError {
    #[error("duplicate element in universe: {element}")]
    #[diagnostic(
        code(akh::diag::duplicate_element),
        help(
            "The universe must list every element exactly once. \
             Deduplicate it before starting the search."
        )
    )]
    DuplicateElement { element: String },

    #[error("required element is not in the working set: {element}")]
    #[diagnostic(
        code(akh::diag::unknown_required),
        help(
            "Every required element must be part of the knowledge base being diagnosed. \
             Add it to the working set or drop it from the required elements."
        )
    )]
    UnknownRequired { element: String },
}

/// Convenience result type for diagnosis operations.
pub type DiagResult<T> = std::result::Result<T, DiagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracle_error_converts_to_diag_error() {
        let err = OracleError::Failed {
            message: "reasoner timed out".into(),
        };
        let diag: DiagError = err.into();
        assert!(matches!(diag, DiagError::Oracle(OracleError::Failed { .. })));
    }

    #[test]
    fn external_error_keeps_source() {
        let io = std::io::Error::other("socket closed");
        let err = OracleError::external(io);
        let msg = format!("{err}");
        assert!(msg.contains("socket closed"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn search_error_display_names_element() {
        let err: DiagError = SearchError::DuplicateElement {
            element: "\"ax7\"".into(),
        }
        .into();
        assert!(format!("{err}").contains("ax7"));
    }
}
