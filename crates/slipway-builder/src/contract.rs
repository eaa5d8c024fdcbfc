//! The versioned builder lifecycle.
//!
//! Builders implement one of two traits - [`BuilderV2`] or [`BuilderV3`] -
//! and are carried as the [`Builder`] enum, whose explicit tag is the
//! version discriminant. The two versions differ in what `build` returns:
//! a v2 build maps deploy paths to artifacts of any kind; a v3 build is
//! exactly one Lambda. Modeling them as distinct traits with their own
//! return types means the orchestrator never shape-checks a result at
//! runtime.
//!
//! A builder's `build` call rejecting is the sole failure signal. Partial
//! output is never valid: dispatch discards everything on failure.

use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::Value;
use slipway_artifact::{Files, Lambda, Output};
use slipway_config::Images;

use crate::dev_server::DevServer;
use crate::error::{Error, Result};
use crate::options::{BuildOptions, PrepareCacheOptions, ShouldServeOptions, StartDevServerOptions};

/// The version-2 lifecycle: zero or more artifacts of any kind, plus
/// build-level extras (routes, image settings, wildcard mappings).
#[async_trait]
pub trait BuilderV2: Send + Sync {
    async fn build(&self, options: &BuildOptions) -> anyhow::Result<BuildResultV2>;

    /// Hand off files to warm the next build of the same entrypoint.
    /// Default: the builder does not participate in the cache protocol.
    async fn prepare_cache(
        &self,
        _options: &PrepareCacheOptions,
    ) -> anyhow::Result<Option<Files>> {
        Ok(None)
    }

    /// Dev-mode routing: should this entrypoint serve the request?
    /// The default matches the request path against the entrypoint.
    fn should_serve(&self, options: &ShouldServeOptions) -> bool {
        options.request_path == options.entrypoint
    }
}

/// The version-3 lifecycle: the builder's whole output is a single server
/// entry. Only v3 builders participate in the dev-server protocol.
#[async_trait]
pub trait BuilderV3: Send + Sync {
    async fn build(&self, options: &BuildOptions) -> anyhow::Result<BuildResultV3>;

    async fn prepare_cache(
        &self,
        _options: &PrepareCacheOptions,
    ) -> anyhow::Result<Option<Files>> {
        Ok(None)
    }

    /// Run a long-lived local process instead of exporting a function
    /// artifact. Default: `None` - the builder opts out, and the
    /// orchestrator falls back to the packaged-function execution path.
    ///
    /// A builder returning `Some` must guarantee the port is already
    /// accepting connections; dispatch verifies this and treats a dead
    /// listener as a contract violation.
    async fn start_dev_server(
        &self,
        _options: &StartDevServerOptions,
    ) -> anyhow::Result<Option<DevServer>> {
        Ok(None)
    }
}

/// A loadable builder, tagged by contract version.
#[derive(Clone)]
pub enum Builder {
    V2(Arc<dyn BuilderV2>),
    V3(Arc<dyn BuilderV3>),
}

impl Builder {
    pub fn version(&self) -> u8 {
        match self {
            Builder::V2(_) => 2,
            Builder::V3(_) => 3,
        }
    }

    /// Invoke the builder's `build`, re-checking preconditions first.
    ///
    /// A rejected call surfaces as [`Error::BuilderFailed`] for this
    /// entrypoint only; sibling entrypoints are unaffected.
    pub async fn build(&self, options: &BuildOptions) -> Result<BuildOutcome> {
        options.validate()?;

        tracing::debug!(
            entrypoint = %options.entrypoint,
            version = self.version(),
            "invoking builder"
        );

        match self {
            Builder::V2(builder) => builder
                .build(options)
                .await
                .map(BuildOutcome::V2)
                .map_err(|error| Error::BuilderFailed {
                    entrypoint: options.entrypoint.clone(),
                    error,
                }),
            Builder::V3(builder) => builder
                .build(options)
                .await
                .map(BuildOutcome::V3)
                .map_err(|error| Error::BuilderFailed {
                    entrypoint: options.entrypoint.clone(),
                    error,
                }),
        }
    }

    /// Dispatch `prepare_cache`. Only meaningful after a succeeded build
    /// for the same entrypoint; callers must not invoke it after a
    /// failure.
    pub async fn prepare_cache(&self, options: &PrepareCacheOptions) -> Result<Option<Files>> {
        let result = match self {
            Builder::V2(builder) => builder.prepare_cache(options).await,
            Builder::V3(builder) => builder.prepare_cache(options).await,
        };
        result.map_err(|error| Error::BuilderFailed {
            entrypoint: options.entrypoint.clone(),
            error,
        })
    }

    /// Dispatch `start_dev_server`. Version-2 builders have no dev-server
    /// protocol and always decline.
    pub async fn start_dev_server(
        &self,
        options: &StartDevServerOptions,
    ) -> Result<Option<DevServer>> {
        match self {
            Builder::V2(_) => Ok(None),
            Builder::V3(builder) => {
                builder
                    .start_dev_server(options)
                    .await
                    .map_err(|error| Error::BuilderFailed {
                        entrypoint: options.entrypoint.clone(),
                        error,
                    })
            }
        }
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("version", &self.version())
            .finish()
    }
}

/// What a version-2 build produces.
#[derive(Debug, Clone, Default)]
pub struct BuildResultV2 {
    /// Deploy path to artifact. Keys are unique by construction.
    pub output: FxHashMap<String, Output>,

    /// Routing rules, passed through opaquely. The schema is owned by the
    /// routing layer; this contract does not interpret it.
    pub routes: Option<Vec<Value>>,

    /// Image optimization settings.
    pub images: Option<Images>,

    /// Wildcard domain to value rewrites.
    pub wildcard: Option<Vec<WildcardEntry>>,
}

impl BuildResultV2 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one artifact at a deploy path.
    pub fn with_output(mut self, path: impl Into<String>, output: impl Into<Output>) -> Self {
        self.output.insert(path.into(), output.into());
        self
    }

    pub fn with_routes(mut self, routes: Vec<Value>) -> Self {
        self.routes = Some(routes);
        self
    }

    pub fn with_images(mut self, images: Images) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_wildcard(mut self, wildcard: Vec<WildcardEntry>) -> Self {
        self.wildcard = Some(wildcard);
        self
    }

    /// Fallback deploy paths declared by prerenders but absent from the
    /// output mapping. The orchestrator warns on these; the contract
    /// itself does not reject them.
    pub fn missing_prerender_fallbacks(&self) -> Vec<&str> {
        self.output
            .values()
            .filter_map(|artifact| artifact.as_prerender())
            .filter_map(|prerender| prerender.fallback.as_deref())
            .filter(|fallback| !self.output.contains_key(*fallback))
            .collect()
    }
}

/// A wildcard domain rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardEntry {
    pub domain: String,
    pub value: String,
}

/// What a version-3 build produces: exactly one Lambda.
///
/// The shape is structural - there is no mapping to hold the wrong count.
/// Builders bridging dynamically-shaped artifact sets go through
/// [`BuildResultV3::from_outputs`], which is where the exactly-one-Lambda
/// contract check lives.
#[derive(Debug, Clone)]
pub struct BuildResultV3 {
    pub output: Lambda,
}

impl BuildResultV3 {
    pub fn new(output: Lambda) -> Self {
        Self { output }
    }

    /// Adapt a dynamic artifact set, enforcing the v3 contract: exactly
    /// one artifact, and that artifact a Lambda. Anything else is a
    /// contract violation, not an empty-output success.
    pub fn from_outputs(outputs: impl IntoIterator<Item = Output>) -> Result<Self> {
        let mut lambda = None;
        let mut total = 0usize;

        for output in outputs {
            total += 1;
            match output {
                Output::Lambda(l) if lambda.is_none() => lambda = Some(l),
                _ => {}
            }
        }

        match (lambda, total) {
            (Some(output), 1) => Ok(Self { output }),
            (None, 0) => Err(Error::ContractViolation(
                "a version 3 build must produce exactly one lambda, got none".to_string(),
            )),
            (None, n) => Err(Error::ContractViolation(format!(
                "a version 3 build must produce exactly one lambda, got {n} non-lambda artifacts"
            ))),
            (Some(_), n) => Err(Error::ContractViolation(format!(
                "a version 3 build must produce exactly one lambda, got {n} artifacts"
            ))),
        }
    }
}

/// A completed build, tagged by the contract version that produced it.
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    V2(BuildResultV2),
    V3(BuildResultV3),
}

impl BuildOutcome {
    pub fn as_v2(&self) -> Option<&BuildResultV2> {
        match self {
            BuildOutcome::V2(result) => Some(result),
            _ => None,
        }
    }

    pub fn as_v3(&self) -> Option<&BuildResultV3> {
        match self {
            BuildOutcome::V3(result) => Some(result),
            _ => None,
        }
    }
}
