//! Cache Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. None of these are fatal to a library walk: ingestion
//! logs them per file and carries on with the rest of the folder.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The file could not be read (permissions, not UTF-8, vanished mid-walk).
    #[display("unable to read document: {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
    /// The document is not valid YAML.
    #[display("malformed document: {_0}")]
    Parse(#[error(not(source))] String),
    /// The document parsed, but one of its namespaces is not shaped as expected.
    #[display("unexpected document shape: {_0}")]
    Shape(#[error(not(source))] String),
    #[display("unable to export summary: {}", _0.display())]
    Export(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Read(_) | Self::Export(_))
    }
}
