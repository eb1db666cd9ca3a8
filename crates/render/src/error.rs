//! Render Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A render error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A template failed to compile. Fix the template; nothing can be rendered
    /// until then.
    #[display("invalid template syntax: {_0}")]
    Syntax(#[error(not(source))] String),
    /// The configured user template directory is missing or unreadable.
    #[display("unable to read template directory: {}", _0.display())]
    TemplateDir(#[error(not(source))] PathBuf),
    /// Asset was not loadable (either file or builtin).
    #[display("template not found: {_0}")]
    AssetNotFound(#[error(not(source))] String),
    /// The template compiled but failed against the given arguments.
    #[display("unable to render template: {_0}")]
    Render(#[error(not(source))] String),
    #[display("unable to write file: {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Write(_))
    }
}
