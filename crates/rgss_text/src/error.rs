//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for the object-graph codec's errors
    #[error(transparent)]
    Marshal(#[from] rgss_marshal::error::Error),

    /// malformed textual tree document
    #[error("parse error at line {line}: {reason}")]
    Parse {
        /// One-based line number where parsing failed
        line: usize,
        /// What went wrong
        reason: String,
    },

    /// two elements of a top-level sequence carry the same id
    ///
    /// Continuing would silently merge two distinct catalog entries
    /// under one identity, so this aborts the read.
    #[error("duplicate id {id}: elements {first_index} and {second_index} of the top-level sequence")]
    DuplicateIdentity {
        /// The colliding id
        id: i64,
        /// Index of the element that carried the id first
        first_index: usize,
        /// Index of the element that carried it again
        second_index: usize,
    },
}

impl Error {
    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        Error::Parse {
            line,
            reason: reason.into(),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
