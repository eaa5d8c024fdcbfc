//! Per-invocation metadata for dev-mode builds.

use std::path::PathBuf;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Environment variable overlay.
pub type Env = FxHashMap<String, String>;

/// Ephemeral flags describing one build invocation.
///
/// `Meta` is how the dev server changes builder behavior without touching
/// the user's configuration: it flags dev mode, points at the dev cache
/// directory, and carries the changed/removed file diffs that make
/// incremental rebuilds possible. Never persisted across builds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_dev: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_cache_dir: Option<PathBuf>,

    /// Skip re-materializing the file snapshot into the work directory
    /// (it is already on disk from a previous dev rebuild).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip_download: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_path: Option<String>,

    /// Paths changed since the previous dev build.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files_changed: Vec<String>,

    /// Paths removed since the previous dev build.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files_removed: Vec<String>,

    #[serde(default, skip_serializing_if = "Env::is_empty")]
    pub env: Env,

    #[serde(default, skip_serializing_if = "Env::is_empty")]
    pub build_env: Env,

    /// Invoker-specific keys, preserved opaquely.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Meta {
    pub fn dev() -> Self {
        Self {
            is_dev: true,
            ..Self::default()
        }
    }
}
