//! Error taxonomy for the builder contract.
//!
//! Contract violations are surfaced distinctly from builder failures so
//! tooling can warn about non-compliant builders rather than reporting a
//! generic build error.

use slipway_artifact::FileError;
use slipway_config::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The entrypoint is not a key of the file snapshot. Fatal; the build
    /// is not attempted.
    #[error("entrypoint `{entrypoint}` is not present in the file snapshot")]
    MissingEntrypoint { entrypoint: String },

    /// A well-known configuration field failed validation. Fatal before
    /// builder invocation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The builder's own `build`, `prepare_cache`, or `start_dev_server`
    /// call rejected. Isolated to this entrypoint.
    #[error("builder failed for `{entrypoint}`: {error}")]
    BuilderFailed {
        entrypoint: String,
        error: anyhow::Error,
    },

    /// The builder resolved successfully but broke the contract: a v3
    /// result without exactly one Lambda, or a dev server reporting
    /// success without a live listener.
    #[error("builder contract violation: {0}")]
    ContractViolation(String),

    #[error("failed to spawn dev server: {source}")]
    DevServerSpawnFailed {
        #[source]
        source: std::io::Error,
    },

    /// The reported dev server port is already bound by another listener.
    #[error("dev server port {port} is already bound")]
    DevServerPortConflict { port: u16 },

    /// At most one dev server may run per entrypoint; stop the previous
    /// instance first.
    #[error("a dev server is already running for `{entrypoint}`")]
    DevServerAlreadyRunning { entrypoint: String },

    #[error(transparent)]
    File(#[from] FileError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
