//! Crate-level error type.

use crate::coloring::ListingError;
use crate::graph::GraphError;

/// Errors returned by the search, the driver and coloring I/O.
///
/// A cancelled search is not an error; it is reported as
/// [`crate::search::SearchResult::Cancelled`].
#[derive(Debug, thiserror::Error)]
pub enum RamseyError {
    /// A target graph or coloring was malformed.
    #[error("invalid graph: {0}")]
    InvalidGraph(#[from] GraphError),
    /// Search parameters are inconsistent (e.g. `k = 0`, wrong number of targets).
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// A persisted coloring could not be parsed.
    #[error("invalid coloring listing: {0}")]
    Listing(#[from] ListingError),
    /// Reading or writing a coloring failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RamseyError {
    pub(crate) fn params(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }
}
