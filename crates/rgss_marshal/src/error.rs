//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// malformed value stream
    #[error("malformed value stream at byte {offset}: {reason}")]
    Decode {
        /// Offset into the stream where decoding failed
        offset: u64,
        /// What went wrong
        reason: String,
    },

    /// packed record geometry does not match its element count
    #[error("size mismatch loading {class}: expected {expected} elements, found {found}")]
    SizeMismatch {
        /// Class name of the packed record
        class: &'static str,
        /// Element count implied by the record's geometry
        expected: usize,
        /// Element count actually present
        found: usize,
    },

    /// unknown class in a packed object
    #[error("unknown packed class {0:?} at byte {1}")]
    UnknownPackedClass(String, u64),
}

impl Error {
    pub(crate) fn decode(offset: u64, reason: impl Into<String>) -> Self {
        Error::Decode {
            offset,
            reason: reason.into(),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
