//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Generic IOError wrapper
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for the object-graph codec's errors
    #[error(transparent)]
    Marshal(#[from] rgss_marshal::error::Error),

    /// a bundle payload that is not a sequence of (ordinal, title, body)
    /// triples
    #[error("malformed script bundle: {reason}")]
    MalformedBundle {
        /// What was wrong with the payload
        reason: String,
    },

    /// an inflated script body that is not valid UTF-8
    #[error("script body is not valid UTF-8")]
    BodyNotUtf8(#[from] std::string::FromUtf8Error),

    /// a script source tree root that does not exist
    #[error("missing script source directory {0}")]
    MissingFile(PathBuf),
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedBundle {
            reason: reason.into(),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
