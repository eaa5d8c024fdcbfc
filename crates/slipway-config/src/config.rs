//! The builder configuration bag.
//!
//! `Config` models the open-ended object a user attaches to a builder
//! record: a fixed set of well-known fields the orchestrator itself
//! consumes, and an opaque extension map for everything else. Unknown keys
//! are never interpreted and never dropped.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::images::Images;
use crate::record::ProjectSettings;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory the framework writes its static output to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_command: Option<String>,

    /// Detected or declared framework slug, e.g. `nextjs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,

    /// Requested Node.js version range, e.g. `20.x`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_version: Option<String>,

    /// Per-function resource overrides, keyed by source glob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<FxHashMap<String, FunctionConfig>>,

    /// Extra files to bring into the function package.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_files: Option<OneOrMany>,

    /// Files to drop from the function package.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_files: Option<OneOrMany>,

    /// Upper bound on the packaged function size, e.g. `50mb`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lambda_size: Option<String>,

    /// Set when the record was synthesized by framework detection rather
    /// than written by the user.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub zero_config: bool,

    /// Image optimization settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Images>,

    /// Dashboard-level project settings mirrored into the build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_settings: Option<ProjectSettings>,

    /// Builder-specific keys, preserved opaquely.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Config {
    /// Parse from a JSON value, e.g. the `config` key of a builder record.
    ///
    /// Parsing accepts any shape the struct tolerates; call [`validate`]
    /// before handing the config to a builder.
    ///
    /// [`validate`]: Config::validate
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Check the well-known fields. Fatal before builder invocation:
    /// a builder is never called with a config that fails here.
    pub fn validate(&self) -> Result<()> {
        if let Some(size) = &self.max_lambda_size {
            parse_size(size).map_err(|message| ConfigError::InvalidValue {
                field: "maxLambdaSize".to_string(),
                message,
            })?;
        }

        if let Some(functions) = &self.functions {
            for (pattern, function) in functions {
                if pattern.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "functions".to_string(),
                        message: "function glob patterns cannot be empty".to_string(),
                    });
                }
                function.validate(pattern)?;
            }
        }

        if let Some(images) = &self.images {
            images.validate()?;
        }

        Ok(())
    }

    /// `max_lambda_size` resolved to bytes, if set.
    pub fn max_lambda_size_bytes(&self) -> Result<Option<u64>> {
        match &self.max_lambda_size {
            None => Ok(None),
            Some(size) => parse_size(size)
                .map(Some)
                .map_err(|message| ConfigError::InvalidValue {
                    field: "maxLambdaSize".to_string(),
                    message,
                }),
        }
    }

    /// Read an opaque builder-specific key.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Resource overrides for functions matching one source glob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionConfig {
    /// Memory limit in megabytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,

    /// Execution duration limit in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<u32>,

    /// Runtime identifier override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_files: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_files: Option<String>,
}

impl FunctionConfig {
    fn validate(&self, pattern: &str) -> Result<()> {
        if self.memory == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: format!("functions[\"{pattern}\"].memory"),
                message: "memory must be a positive number of megabytes".to_string(),
            });
        }
        if self.max_duration == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: format!("functions[\"{pattern}\"].maxDuration"),
                message: "maxDuration must be a positive number of seconds".to_string(),
            });
        }
        Ok(())
    }
}

/// A glob field that accepts either a single pattern or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            OneOrMany::One(one) => std::slice::from_ref(one),
            OneOrMany::Many(many) => many,
        };
        slice.iter().map(String::as_str)
    }
}

/// Parse a human-readable size string (`"50mb"`, `"1gb"`, `"1048576"`)
/// into bytes. Errors carry a plain message; callers attach the field.
pub fn parse_size(input: &str) -> std::result::Result<u64, String> {
    let trimmed = input.trim().to_ascii_lowercase();
    if trimmed.is_empty() {
        return Err("size cannot be empty".to_string());
    }

    let (digits, multiplier) = if let Some(number) = trimmed.strip_suffix("gb") {
        (number, 1024 * 1024 * 1024)
    } else if let Some(number) = trimmed.strip_suffix("mb") {
        (number, 1024 * 1024)
    } else if let Some(number) = trimmed.strip_suffix("kb") {
        (number, 1024)
    } else if let Some(number) = trimmed.strip_suffix('b') {
        (number, 1)
    } else {
        (trimmed.as_str(), 1)
    };

    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("`{input}` is not a valid size"))?;
    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("`{input}` overflows"))
}
