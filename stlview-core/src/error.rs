//! Error types for STL decoding and encoding.

use std::path::PathBuf;
use thiserror::Error;

use crate::stl::AsciiState;

/// Result type for STL operations.
pub type StlResult<T> = Result<T, StlError>;

/// Errors that can occur while reading or writing STL data.
///
/// A decode error does not imply an empty mesh: under
/// [`LoadPolicy::BestEffort`](crate::stl::LoadPolicy::BestEffort) the facets
/// read before the failure stay in the target mesh.
#[derive(Debug, Error)]
pub enum StlError {
    /// The file could not be opened. The target mesh is untouched.
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Binary file shorter than its 80-byte header plus facet count.
    #[error("truncated STL header: expected 84 bytes, got {got}")]
    TruncatedHeader { got: usize },

    /// An ASCII token that does not advance the facet grammar.
    #[error("unexpected token `{token}` where {state} was expected")]
    UnexpectedToken { token: String, state: AsciiState },

    /// ASCII input ended in the middle of a facet.
    #[error("unexpected end of input where {state} was expected")]
    UnexpectedEof { state: AsciiState },

    /// A binary facet record shorter than 50 bytes.
    #[error("truncated record {index}: expected 50 bytes, got {got}")]
    TruncatedRecord { index: u32, got: usize },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
