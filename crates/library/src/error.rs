//! Library Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.
//!
//! Only [`ErrorKind::Connect`] and [`ErrorKind::Settings`] stop a run. Every
//! other kind is caught at the collection, item or template it happened in,
//! logged, and the walk moves on to the next sibling.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The media server (or its catalog snapshot) could not be reached.
    #[display("unable to connect to media server: {_0}")]
    Connect(#[error(not(source))] String),
    /// The settings cannot drive a walk (e.g. an unknown file name format).
    #[display("invalid settings: {_0}")]
    Settings(#[error(not(source))] String),
    /// The media server failed to list a library's contents.
    #[display("unable to query library: {_0}")]
    Query(#[error(not(source))] String),
    /// A file name template could not be rendered into a safe relative path.
    #[display("issue with path generation from template")]
    Template,
    #[display("invalid output path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    #[display("unable to process collection: {_0}")]
    Collection(#[error(not(source))] String),
    #[display("unable to process item: {_0}")]
    Item(#[error(not(source))] String),
    /// A template failed to render or its output could not be written.
    #[display("unable to generate file: {}", _0.display())]
    Output(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Query(_) | Self::Output(_))
    }
}
