//! The incremental cache protocol.
//!
//! A one-way, advisory handoff: after a build succeeds, `prepare_cache`
//! asks the builder which files should be restored into the work
//! directory before the next build of the same entrypoint - dependency
//! directories and other build-tool state, not source. The orchestrator
//! may skip restoration entirely (cold build), and restoration failures
//! degrade to a cold build rather than failing the invocation. Builders
//! must tolerate an absent or stale cache and still build correctly.

use std::path::Path;

use slipway_artifact::{download_files, Files};

use crate::contract::Builder;
use crate::error::Result;
use crate::options::PrepareCacheOptions;

/// Ask the builder for cache content after a succeeded build.
///
/// Only meaningful after a `build` for the same entrypoint resolved
/// successfully; calling it after a failed build is undefined and the
/// orchestrator avoids it. `Ok(None)` means the builder does not
/// participate in the cache protocol. The returned map need not contain
/// the entrypoint.
pub async fn prepare_cache(
    builder: &Builder,
    options: &PrepareCacheOptions,
) -> Result<Option<Files>> {
    let cache = builder.prepare_cache(options).await?;
    if let Some(files) = &cache {
        tracing::debug!(
            entrypoint = %options.entrypoint,
            count = files.len(),
            "builder prepared cache"
        );
    }
    Ok(cache)
}

/// Restore a previously-prepared cache into a work directory.
///
/// Advisory: returns `true` when every file was materialized, `false`
/// when restoration failed and the build should proceed cold. Never
/// propagates an error - an unreadable cache must not fail the build.
pub async fn restore_cache(files: &Files, work_path: &Path) -> bool {
    match download_files(files, work_path).await {
        Ok(()) => {
            tracing::debug!(count = files.len(), dir = %work_path.display(), "cache restored");
            true
        }
        Err(err) => {
            tracing::warn!(
                dir = %work_path.display(),
                error = %err,
                "cache restoration failed; continuing with a cold build"
            );
            false
        }
    }
}
