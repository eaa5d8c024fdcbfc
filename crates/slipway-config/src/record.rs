//! Builder records and project settings.

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// One entry in a project's build definition: which builder handles which
/// source files, with what configuration.
///
/// Many records may match overlapping files; resolution order across
/// records is the orchestrator's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderRecord {
    /// Builder implementation identifier, e.g. `@slipway/static`.
    #[serde(rename = "use")]
    pub use_: String,

    /// Source glob the builder applies to. Glob expansion into discrete
    /// entrypoints happens before builders are invoked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Config>,
}

impl BuilderRecord {
    pub fn new(use_: impl Into<String>) -> Self {
        Self {
            use_: use_.into(),
            src: None,
            config: None,
        }
    }

    pub fn src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }
}

/// Dashboard-level project settings mirrored into build configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<String>,

    /// Project root within the repository, for monorepos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_directory: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub source_files_outside_root_directory: bool,
}
