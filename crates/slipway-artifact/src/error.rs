//! Error types for file access and materialization.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FileError>;

#[derive(Debug, Error)]
pub enum FileError {
    /// Synchronous stream access attempted on a variant that requires
    /// asynchronous materialization.
    #[error("synchronous access is not supported for {0}; use to_stream_async")]
    UnsupportedAccess(String),

    /// Remote content could not be fetched.
    #[error("failed to fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A deploy path escapes its target directory.
    #[error("refusing to materialize outside the target directory: {0}")]
    UnsafePath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
