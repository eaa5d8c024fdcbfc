//! Image optimization settings.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigError, Result};

/// Output formats the image optimizer may negotiate.
///
/// The enumeration is closed: a value outside it is a configuration error,
/// rejected at parse time rather than silently passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageFormat {
    #[serde(rename = "image/avif")]
    Avif,
    #[serde(rename = "image/webp")]
    Webp,
}

impl ImageFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "image/avif" => Ok(ImageFormat::Avif),
            "image/webp" => Ok(ImageFormat::Webp),
            other => Err(ConfigError::UnsupportedImageFormat(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Avif => "image/avif",
            ImageFormat::Webp => "image/webp",
        }
    }
}

impl<'de> Deserialize<'de> for ImageFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ImageFormat::parse(&raw).map_err(D::Error::custom)
    }
}

/// Settings for the platform image optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Images {
    /// Source domains images may be optimized from.
    pub domains: Vec<String>,

    /// Device widths the optimizer may resize to.
    pub sizes: Vec<u16>,

    /// Cache lifetime floor for optimized images, in seconds.
    #[serde(
        default,
        rename = "minimumCacheTTL",
        skip_serializing_if = "Option::is_none"
    )]
    pub minimum_cache_ttl: Option<u32>,

    /// Output formats to negotiate, in preference order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<ImageFormat>>,
}

impl Images {
    pub fn validate(&self) -> Result<()> {
        if self.domains.iter().any(|d| d.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "images.domains".to_string(),
                message: "domains cannot contain empty strings".to_string(),
            });
        }
        if self.sizes.iter().any(|s| *s == 0) {
            return Err(ConfigError::InvalidValue {
                field: "images.sizes".to_string(),
                message: "sizes must be positive".to_string(),
            });
        }
        Ok(())
    }
}
