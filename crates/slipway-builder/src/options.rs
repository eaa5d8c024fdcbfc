//! Build invocation options.
//!
//! `BuildOptions` packages everything one builder invocation sees: the
//! full file snapshot, the single entrypoint being built, the writable
//! work directory, user configuration, and dev-mode metadata. The
//! aggregate is handed to the builder whole and is immutable for the
//! duration of the call.

use std::path::PathBuf;

use slipway_artifact::Files;
use slipway_config::{Config, Meta};

use crate::error::{Error, Result};

/// Options for one `build` invocation.
///
/// # Examples
///
/// ```
/// use slipway_artifact::{File, FileBlob, Files};
/// use slipway_builder::BuildOptions;
///
/// # fn example() -> slipway_builder::Result<()> {
/// let mut files = Files::default();
/// files.insert("index.js".into(), File::from(FileBlob::new("module.exports = 1;")));
///
/// let options = BuildOptions::new(files, "index.js", "/tmp/work", Default::default())?;
/// assert_eq!(options.entrypoint, "index.js");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// All source files of the project, keyed by deploy-relative path.
    /// A read-only snapshot: it may be shared with builds for other
    /// entrypoints running concurrently.
    pub files: Files,

    /// The single file this invocation is responsible for. Always a
    /// discrete file and never a glob; guaranteed to be a key of `files`.
    pub entrypoint: String,

    /// Writable scratch directory for this build. Populated with the
    /// restored cache when one is available.
    pub work_path: PathBuf,

    /// Repository root, when the project root is a subdirectory of a
    /// monorepo. Distinct from `work_path`.
    pub repo_root_path: Option<PathBuf>,

    /// User configuration from the builder record.
    pub config: Config,

    /// Ephemeral invoker metadata; present in dev mode.
    pub meta: Option<Meta>,
}

impl BuildOptions {
    /// Assemble options, enforcing the contract's preconditions:
    ///
    /// - `entrypoint` must be a key of `files`, otherwise
    ///   [`Error::MissingEntrypoint`], and the build is not attempted;
    /// - `config` must pass validation, otherwise [`Error::InvalidConfig`].
    pub fn new(
        files: Files,
        entrypoint: impl Into<String>,
        work_path: impl Into<PathBuf>,
        config: Config,
    ) -> Result<Self> {
        let entrypoint = entrypoint.into();
        if !files.contains_key(&entrypoint) {
            return Err(Error::MissingEntrypoint { entrypoint });
        }
        config.validate()?;

        Ok(Self {
            files,
            entrypoint,
            work_path: work_path.into(),
            repo_root_path: None,
            config,
            meta: None,
        })
    }

    /// Set the repository root for monorepo builds.
    pub fn repo_root_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.repo_root_path = Some(path.into());
        self
    }

    /// Attach dev-mode metadata.
    pub fn meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// True when the invoker is a dev server rather than a deployment.
    pub fn is_dev(&self) -> bool {
        self.meta.as_ref().is_some_and(|m| m.is_dev)
    }

    /// The entrypoint's file handle.
    pub fn entrypoint_file(&self) -> &slipway_artifact::File {
        &self.files[&self.entrypoint]
    }

    /// Re-check the preconditions. Dispatch calls this before every
    /// builder invocation so a mutated aggregate still fails closed.
    pub fn validate(&self) -> Result<()> {
        if !self.files.contains_key(&self.entrypoint) {
            return Err(Error::MissingEntrypoint {
                entrypoint: self.entrypoint.clone(),
            });
        }
        self.config.validate()?;
        Ok(())
    }

    /// The reduced shape handed to `prepare_cache`: the completed build's
    /// snapshot and directories, without the ephemeral `Meta`.
    pub fn to_prepare_cache_options(&self) -> PrepareCacheOptions {
        PrepareCacheOptions {
            files: self.files.clone(),
            entrypoint: self.entrypoint.clone(),
            work_path: self.work_path.clone(),
            repo_root_path: self.repo_root_path.clone(),
            config: self.config.clone(),
        }
    }
}

/// Options for `prepare_cache`, describing a *completed* build.
#[derive(Debug, Clone)]
pub struct PrepareCacheOptions {
    pub files: Files,
    pub entrypoint: String,
    pub work_path: PathBuf,
    pub repo_root_path: Option<PathBuf>,
    pub config: Config,
}

/// `start_dev_server` receives the same shape as `build`.
pub type StartDevServerOptions = BuildOptions;

/// Options for `should_serve`: dev-mode request routing.
#[derive(Debug, Clone)]
pub struct ShouldServeOptions {
    /// Path string from the incoming request, without a leading `/`.
    pub request_path: String,
    pub entrypoint: String,
    pub files: Files,
    pub work_path: PathBuf,
    pub config: Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipway_artifact::{File, FileBlob};

    fn snapshot(paths: &[&str]) -> Files {
        let mut files = Files::default();
        for path in paths {
            files.insert(path.to_string(), File::from(FileBlob::new("x")));
        }
        files
    }

    #[test]
    fn entrypoint_must_be_a_member() {
        let err = BuildOptions::new(
            snapshot(&["index.js"]),
            "missing.js",
            "/tmp/w",
            Config::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            Error::MissingEntrypoint { entrypoint } if entrypoint == "missing.js"
        ));
    }

    #[test]
    fn invalid_config_is_fatal_before_any_builder_call() {
        let config = Config::from_value(serde_json::json!({ "maxLambdaSize": "not-a-size" }))
            .unwrap();
        let err =
            BuildOptions::new(snapshot(&["index.js"]), "index.js", "/tmp/w", config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn prepare_cache_options_drop_meta() {
        let options = BuildOptions::new(
            snapshot(&["index.js"]),
            "index.js",
            "/tmp/w",
            Config::default(),
        )
        .unwrap()
        .meta(slipway_config::Meta::dev());

        assert!(options.is_dev());
        let cache_options = options.to_prepare_cache_options();
        assert_eq!(cache_options.entrypoint, "index.js");
        // PrepareCacheOptions has no meta field; nothing ephemeral crosses
        // into the cache protocol.
    }
}
