//! Package manifest parsing and Node.js version selection.
//!
//! The package manifest is read-only input for builder auto-detection:
//! the orchestrator inspects dependencies and scripts to decide which
//! builder handles a project, and resolves the `engines.node` range
//! against the supported runtime table. This contract never mutates it.

use std::collections::BTreeMap;

use semver::{Version, VersionReq};
use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Standard package descriptor fields consulted for auto-detection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,

    #[serde(default)]
    pub scripts: BTreeMap<String, String>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,

    #[serde(default)]
    pub engines: Option<Engines>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Engines {
    pub node: Option<String>,
    pub npm: Option<String>,
}

impl PackageManifest {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// True if `name` appears in dependencies or dev-dependencies.
    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }

    pub fn script(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).map(String::as_str)
    }

    /// The `engines.node` range, if declared.
    pub fn node_range(&self) -> Option<&str> {
        self.engines.as_ref().and_then(|e| e.node.as_deref())
    }
}

/// One deployable Node.js runtime generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeVersion {
    pub major: u64,
    /// Canonical range string, e.g. `20.x`.
    pub range: &'static str,
    /// Runtime identifier used in Lambda packaging.
    pub runtime: &'static str,
    /// Discontinued versions are detected but refused for new builds.
    pub discontinued: bool,
}

/// Newest first. The first entry is the default for projects that do not
/// declare an `engines.node` range.
static NODE_VERSIONS: &[NodeVersion] = &[
    NodeVersion {
        major: 22,
        range: "22.x",
        runtime: "nodejs22.x",
        discontinued: false,
    },
    NodeVersion {
        major: 20,
        range: "20.x",
        runtime: "nodejs20.x",
        discontinued: false,
    },
    NodeVersion {
        major: 18,
        range: "18.x",
        runtime: "nodejs18.x",
        discontinued: true,
    },
    NodeVersion {
        major: 16,
        range: "16.x",
        runtime: "nodejs16.x",
        discontinued: true,
    },
];

/// Resolve an `engines.node` range to a deployable runtime.
///
/// The newest satisfying version wins. A range that only matches
/// discontinued versions is rejected so stale manifests fail loudly
/// instead of deploying onto a dead runtime.
pub fn pick_node_version(range: Option<&str>) -> Result<&'static NodeVersion> {
    let Some(range) = range else {
        return Ok(&NODE_VERSIONS[0]);
    };

    let req = VersionReq::parse(range).map_err(|err| ConfigError::InvalidValue {
        field: "engines.node".to_string(),
        message: format!("`{range}` is not a valid version range: {err}"),
    })?;

    for version in NODE_VERSIONS {
        // Match against the newest conceivable release of the major line
        // so ranges like `^20.10` select it.
        if req.matches(&Version::new(version.major, u64::MAX, u64::MAX)) {
            if version.discontinued {
                return Err(ConfigError::DiscontinuedNodeVersion {
                    major: version.major,
                });
            }
            return Ok(version);
        }
    }

    Err(ConfigError::UnsupportedNodeVersion {
        range: range.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_fields_parse() {
        let manifest = PackageManifest::from_json(
            r#"{
                "name": "my-app",
                "scripts": { "build": "next build", "dev": "next dev" },
                "dependencies": { "next": "^15.0.0" },
                "devDependencies": { "typescript": "^5.6.0" },
                "engines": { "node": ">=20" }
            }"#,
        )
        .unwrap();

        assert!(manifest.has_dependency("next"));
        assert!(manifest.has_dependency("typescript"));
        assert!(!manifest.has_dependency("react"));
        assert_eq!(manifest.script("build"), Some("next build"));
        assert_eq!(manifest.node_range(), Some(">=20"));
    }

    #[test]
    fn newest_satisfying_version_wins() {
        assert_eq!(pick_node_version(Some(">=18")).unwrap().major, 22);
        assert_eq!(pick_node_version(Some("20.x")).unwrap().major, 20);
        assert_eq!(pick_node_version(None).unwrap().major, 22);
    }

    #[test]
    fn discontinued_versions_are_refused() {
        let err = pick_node_version(Some("16.x")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DiscontinuedNodeVersion { major: 16 }
        ));
    }

    #[test]
    fn unsatisfiable_ranges_are_refused() {
        assert!(matches!(
            pick_node_version(Some(">=99")),
            Err(ConfigError::UnsupportedNodeVersion { .. })
        ));
        assert!(matches!(
            pick_node_version(Some("not-a-range")),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
