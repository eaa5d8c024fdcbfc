//! Packaged serverless function artifact.

use rustc_hash::FxHashMap;

use crate::files::Files;

/// A packaged function: code, handler, runtime identifier, and resource
/// limits. How the package is physically uploaded and executed is outside
/// this contract.
#[derive(Debug, Clone)]
pub struct Lambda {
    /// The code and supporting files of the function package.
    pub files: Files,

    /// Entry handler within the package, e.g. `index.handler`.
    pub handler: String,

    /// Runtime identifier, e.g. `nodejs20.x` or `provided.al2`.
    pub runtime: String,

    /// Memory limit in megabytes. `None` defers to platform defaults.
    pub memory: Option<u32>,

    /// Execution duration limit in seconds. `None` defers to platform
    /// defaults.
    pub max_duration: Option<u32>,

    /// Environment overlay applied when the function runs.
    pub environment: FxHashMap<String, String>,
}

impl Lambda {
    pub fn new(files: Files, handler: impl Into<String>, runtime: impl Into<String>) -> Self {
        Self {
            files,
            handler: handler.into(),
            runtime: runtime.into(),
            memory: None,
            max_duration: None,
            environment: FxHashMap::default(),
        }
    }

    /// Set the memory limit in megabytes.
    pub fn memory(mut self, megabytes: u32) -> Self {
        self.memory = Some(megabytes);
        self
    }

    /// Set the execution duration limit in seconds.
    pub fn max_duration(mut self, seconds: u32) -> Self {
        self.max_duration = Some(seconds);
        self
    }

    /// Add one environment variable to the overlay.
    pub fn env_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_style_construction() {
        let lambda = Lambda::new(Files::default(), "index.handler", "nodejs20.x")
            .memory(1024)
            .max_duration(30)
            .env_var("NODE_ENV", "production");

        assert_eq!(lambda.handler, "index.handler");
        assert_eq!(lambda.runtime, "nodejs20.x");
        assert_eq!(lambda.memory, Some(1024));
        assert_eq!(lambda.max_duration, Some(30));
        assert_eq!(lambda.environment["NODE_ENV"], "production");
    }
}
