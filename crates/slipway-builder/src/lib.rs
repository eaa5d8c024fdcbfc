//! # slipway-builder
//!
//! The Slipway build output contract: a versioned protocol that lets
//! independent, pluggable builders transform a project's source files
//! into deployable artifacts under a uniform interface.
//!
//! A builder implements [`BuilderV2`] or [`BuilderV3`] and is carried as
//! a version-tagged [`Builder`]. The orchestrator assembles
//! [`BuildOptions`], dispatches `build`, and receives a
//! [`BuildOutcome`]. Around that core sit two optional protocols: the
//! advisory cache handoff ([`cache`]) and the dev-server spawn protocol
//! ([`DevServerRegistry`]).
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use slipway_artifact::{File, FileBlob, Files};
//! use slipway_builder::{
//!     Builder, BuilderV2, BuildOptions, BuildResultV2,
//! };
//!
//! struct Passthrough;
//!
//! #[async_trait]
//! impl BuilderV2 for Passthrough {
//!     async fn build(&self, options: &BuildOptions) -> anyhow::Result<BuildResultV2> {
//!         let file = options.entrypoint_file().clone();
//!         Ok(BuildResultV2::new().with_output(options.entrypoint.clone(), file))
//!     }
//! }
//!
//! # async fn example() -> slipway_builder::Result<()> {
//! let mut files = Files::default();
//! files.insert("index.html".into(), File::from(FileBlob::new("<html>")));
//!
//! let options = BuildOptions::new(files, "index.html", "/tmp/work", Default::default())?;
//! let builder = Builder::V2(Arc::new(Passthrough));
//! let outcome = builder.build(&options).await?;
//! assert!(outcome.as_v2().unwrap().output.contains_key("index.html"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure isolation
//!
//! A builder failure is scoped to its entrypoint: [`execute_builds`]
//! returns one `Result` per entrypoint, and a rejected build never
//! blocks or corrupts a sibling's.

pub mod cache;
mod contract;
mod dev_server;
mod error;
mod executor;
mod options;

#[cfg(feature = "logging")]
pub mod logging;

pub use contract::{
    BuildOutcome, BuildResultV2, BuildResultV3, Builder, BuilderV2, BuilderV3, WildcardEntry,
};
pub use dev_server::{
    allocate_port, spawn_dev_command, wait_until_ready, DevServer, DevServerRegistry,
};
pub use error::{Error, Result};
pub use executor::{execute_builds, EntrypointBuild};
pub use options::{BuildOptions, PrepareCacheOptions, ShouldServeOptions, StartDevServerOptions};
