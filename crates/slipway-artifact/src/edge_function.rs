//! Edge function artifact.

use rustc_hash::FxHashMap;

use crate::files::Files;

/// Code targeted at an edge execution runtime.
///
/// Edge functions carry a distinct resource model from [`Lambda`]: there
/// are no memory or duration knobs, and the entrypoint names a module
/// inside `files` rather than a handler export.
///
/// [`Lambda`]: crate::Lambda
#[derive(Debug, Clone)]
pub struct EdgeFunction {
    /// Module within `files` the edge runtime boots.
    pub entrypoint: String,

    /// The code and supporting files of the function.
    pub files: Files,

    /// Environment overlay applied when the function runs.
    pub environment: FxHashMap<String, String>,
}

impl EdgeFunction {
    pub fn new(entrypoint: impl Into<String>, files: Files) -> Self {
        Self {
            entrypoint: entrypoint.into(),
            files,
            environment: FxHashMap::default(),
        }
    }

    pub fn env_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(name.into(), value.into());
        self
    }
}
