//! # slipway-config
//!
//! Configuration model for the Slipway build output contract.
//!
//! The central type is [`Config`]: a fixed struct of well-known fields the
//! orchestrator consumes (output directory, install/build/dev commands,
//! detected framework, per-function resource overrides) plus an explicit
//! opaque extension map. Builder-specific keys the orchestrator does not
//! understand are preserved verbatim across serialize/parse round trips.
//!
//! Also here: per-invocation [`Meta`] flags for dev-mode rebuilds, the
//! [`BuilderRecord`] binding a source glob to a builder implementation,
//! image-optimization settings with a closed format enumeration, and the
//! read-only [`PackageManifest`] consulted for builder auto-detection.

mod config;
mod error;
mod images;
mod manifest;
mod meta;
mod record;

pub use config::{parse_size, Config, FunctionConfig, OneOrMany};
pub use error::{ConfigError, Result};
pub use images::{ImageFormat, Images};
pub use manifest::{pick_node_version, Engines, NodeVersion, PackageManifest};
pub use meta::{Env, Meta};
pub use record::{BuilderRecord, ProjectSettings};
