//! Project snapshots and their materialization.
//!
//! A [`Files`] map is the full set of source files handed to one build
//! invocation, keyed by deploy-relative path. The snapshot is read-only
//! input: keys are unique and insertion order is irrelevant.

use std::path::{Component, Path, PathBuf};

use rustc_hash::FxHashMap;
use walkdir::WalkDir;

use crate::error::{FileError, Result};
use crate::file::{mode_from_metadata, File, FileFsRef};

/// Mapping from deploy-relative path to [`File`].
pub type Files = FxHashMap<String, File>;

/// Walk `dir` into a [`Files`] map of filesystem references.
///
/// Keys are relative to `dir` and use `/` separators regardless of
/// platform. Mode bits are captured from disk metadata.
pub fn glob_files(dir: impl AsRef<Path>) -> Result<Files> {
    let dir = dir.as_ref();
    let mut files = Files::default();

    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(std::io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .expect("walkdir yields paths under its root");
        let key = deploy_key(rel);
        let mode = mode_from_metadata(&entry.metadata().map_err(std::io::Error::other)?);
        files.insert(
            key,
            File::FsRef(FileFsRef::new(entry.path()).with_mode(mode)),
        );
    }

    tracing::debug!(count = files.len(), dir = %dir.display(), "collected project snapshot");
    Ok(files)
}

/// Materialize a [`Files`] map under `dir`, preserving mode bits.
///
/// Used by the orchestrator to stage work directories and restore caches.
/// Rejects deploy paths that would escape `dir` (absolute paths or `..`
/// components) with [`FileError::UnsafePath`].
pub async fn download_files(files: &Files, dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();

    for (deploy_path, file) in files {
        let target = resolve_deploy_path(dir, deploy_path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut reader = file.to_stream_async().await?;
        let mut out = tokio::fs::File::create(&target).await?;
        tokio::io::copy(&mut reader, &mut out).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(file.mode() & 0o7777);
            tokio::fs::set_permissions(&target, perms).await?;
        }

        tracing::trace!(path = %deploy_path, "materialized file");
    }

    Ok(())
}

/// Join a deploy-relative key onto `dir`, refusing traversal.
fn resolve_deploy_path(dir: &Path, deploy_path: &str) -> Result<PathBuf> {
    let rel = Path::new(deploy_path);
    let safe = rel.components().all(|c| matches!(c, Component::Normal(_)));
    if deploy_path.is_empty() || !safe {
        return Err(FileError::UnsafePath(deploy_path.to_string()));
    }
    Ok(dir.join(rel))
}

fn deploy_key(rel: &Path) -> String {
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    parts.join("/")
}
