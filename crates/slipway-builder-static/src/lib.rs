//! # slipway-builder-static
//!
//! The reference version-2 builder: source files come back out as static
//! passthrough assets. No compilation, no routes, no image settings - the
//! simplest possible implementation of the build output contract, and the
//! template for writing real builder crates.
//!
//! Deploy paths mirror source paths, except that a configured
//! `outputDirectory` prefix is stripped so `public/index.html` deploys at
//! `index.html`.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use slipway_builder::Builder;
//! use slipway_builder_static::StaticBuilder;
//!
//! let builder = Builder::V2(Arc::new(StaticBuilder::default()));
//! ```

use async_trait::async_trait;
use slipway_artifact::File;
use slipway_builder::{BuildOptions, BuildResultV2, BuilderV2};

/// Passes the entrypoint through unchanged as a static asset.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticBuilder;

#[async_trait]
impl BuilderV2 for StaticBuilder {
    async fn build(&self, options: &BuildOptions) -> anyhow::Result<BuildResultV2> {
        let deploy_path = deploy_path(&options.entrypoint, &options.config);
        let file = annotate(options.entrypoint_file().clone(), &options.entrypoint);

        tracing::debug!(
            entrypoint = %options.entrypoint,
            deploy_path = %deploy_path,
            "passing static file through"
        );

        Ok(BuildResultV2::new().with_output(deploy_path, file))
    }
}

/// Strip the configured output directory prefix, if any.
fn deploy_path(entrypoint: &str, config: &slipway_config::Config) -> String {
    if let Some(output_directory) = &config.output_directory {
        let prefix = format!("{}/", output_directory.trim_end_matches('/'));
        if let Some(stripped) = entrypoint.strip_prefix(&prefix) {
            return stripped.to_string();
        }
    }
    entrypoint.to_string()
}

/// Fill in a content type from the file extension when the source file
/// does not already carry one.
fn annotate(file: File, path: &str) -> File {
    if file.content_type().is_some() {
        return file;
    }
    let Some(content_type) = content_type_for(path) else {
        return file;
    };
    match file {
        File::Blob(blob) => File::Blob(blob.with_content_type(content_type)),
        File::FsRef(fs_ref) => File::FsRef(fs_ref.with_content_type(content_type)),
        File::Ref(remote) => File::Ref(remote.with_content_type(content_type)),
    }
}

fn content_type_for(path: &str) -> Option<&'static str> {
    let extension = path.rsplit_once('.')?.1;
    match extension {
        "html" | "htm" => Some("text/html"),
        "css" => Some("text/css"),
        "js" | "mjs" => Some("text/javascript"),
        "json" => Some("application/json"),
        "svg" => Some("image/svg+xml"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "avif" => Some("image/avif"),
        "txt" => Some("text/plain"),
        "wasm" => Some("application/wasm"),
        _ => None,
    }
}
