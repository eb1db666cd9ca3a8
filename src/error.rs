//! Application Error Types
//!
//! Every error that reaches `main` is a configuration-level failure; the walk
//! handles everything else itself.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An application error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("unable to load settings")]
    Settings,
    #[display("unable to load templates")]
    Templates,
    #[display("unable to connect to media server")]
    Connect,
    #[display("library walk failed")]
    Walk,
    #[display("unable to export summary to {}", _0.display())]
    Export(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connect | Self::Export(_))
    }
}
