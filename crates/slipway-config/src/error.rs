//! Error types for configuration validation and loading.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A well-known field holds a value of the wrong shape.
    #[error("invalid value for `{field}`: {message}")]
    InvalidValue { field: String, message: String },

    /// An image format outside the closed enumeration.
    #[error("unsupported image format: {0} (expected image/avif or image/webp)")]
    UnsupportedImageFormat(String),

    /// No supported Node.js version satisfies the requested range.
    #[error("no supported Node.js version satisfies `{range}`")]
    UnsupportedNodeVersion { range: String },

    /// The range resolves only to a version that can no longer be deployed.
    #[error("Node.js {major}.x is discontinued and can no longer be deployed")]
    DiscontinuedNodeVersion { major: u64 },

    #[error("configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
