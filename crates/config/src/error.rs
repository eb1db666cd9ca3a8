//! Configuration Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Every variant is a configuration-level failure: the program cannot start
/// until the user fixes their settings.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// One of the configuration sources could not be read or merged.
    #[display("unable to load configuration")]
    Load,
    /// The merged configuration is structurally valid but semantically wrong.
    #[display("invalid configuration: {_0}")]
    Invalid(#[error(not(source))] String),
    /// No usable media server source was configured.
    #[display("no media server catalog configured")]
    MissingCatalog,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
