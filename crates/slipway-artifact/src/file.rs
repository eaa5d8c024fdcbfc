//! Polymorphic file handles with unified streaming access.
//!
//! A [`File`] is one of three variants: an in-memory blob, a reference to a
//! file on disk, or a reference to remote content addressed by URL. All
//! variants carry POSIX mode bits and an optional content type, and every
//! variant hands out a *fresh* byte stream on each acquisition.
//!
//! Variants advertise their access capability up front via
//! [`StreamCapability`]: callers that hold a `Sync` file may use
//! [`File::to_stream`]; `AsyncOnly` files (remote content that requires I/O
//! to materialize) are only reachable through [`File::to_stream_async`].

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::OnceCell;

use crate::error::{FileError, Result};

/// Regular, non-executable file mode.
pub const DEFAULT_FILE_MODE: u32 = 0o100644;

/// A fresh synchronous byte stream. Never a shared single-use handle.
pub type ByteStream = Box<dyn std::io::Read + Send>;

/// A fresh asynchronous byte stream.
pub type AsyncByteStream = Box<dyn tokio::io::AsyncRead + Send + Unpin>;

/// How a [`File`] variant's content may be acquired.
///
/// This is a static property of the variant, not something callers probe for
/// at runtime: `Sync` variants support both access paths, `AsyncOnly`
/// variants reject [`File::to_stream`] with
/// [`FileError::UnsupportedAccess`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamCapability {
    /// Content is available without suspending (blob, local file).
    Sync,
    /// Content requires asynchronous I/O to materialize (remote reference).
    AsyncOnly,
}

/// A content handle in a project snapshot or build output.
///
/// Immutable once constructed; callers never mutate a `File` in place.
/// Cloning is cheap: blob bytes and fetched remote content are shared.
#[derive(Debug, Clone)]
pub enum File {
    /// In-memory content.
    Blob(FileBlob),
    /// Content on the local filesystem.
    FsRef(FileFsRef),
    /// Remote content addressed by URL, fetched lazily.
    Ref(FileRef),
}

impl File {
    /// POSIX mode bits. The executable bit matters for packaging.
    pub fn mode(&self) -> u32 {
        match self {
            File::Blob(f) => f.mode,
            File::FsRef(f) => f.mode,
            File::Ref(f) => f.mode,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        match self {
            File::Blob(f) => f.content_type.as_deref(),
            File::FsRef(f) => f.content_type.as_deref(),
            File::Ref(f) => f.content_type.as_deref(),
        }
    }

    pub fn is_executable(&self) -> bool {
        self.mode() & 0o111 != 0
    }

    /// Which access paths are valid for this variant.
    pub fn stream_capability(&self) -> StreamCapability {
        match self {
            File::Blob(_) | File::FsRef(_) => StreamCapability::Sync,
            File::Ref(_) => StreamCapability::AsyncOnly,
        }
    }

    /// Acquire a fresh synchronous reader over the content.
    ///
    /// Every call returns a new stream positioned at the start. Fails with
    /// [`FileError::UnsupportedAccess`] for `AsyncOnly` variants rather
    /// than returning empty content.
    pub fn to_stream(&self) -> Result<ByteStream> {
        match self {
            File::Blob(f) => Ok(Box::new(Cursor::new(f.data.clone()))),
            File::FsRef(f) => {
                let file = std::fs::File::open(&f.fs_path)?;
                Ok(Box::new(file))
            }
            File::Ref(f) => Err(FileError::UnsupportedAccess(f.url.clone())),
        }
    }

    /// Acquire a fresh asynchronous reader over the content.
    ///
    /// Legal on every variant, and the only access path for `AsyncOnly`
    /// variants. Remote content is fetched once and memoized, so repeated
    /// acquisition yields byte-identical streams without re-fetching.
    pub async fn to_stream_async(&self) -> Result<AsyncByteStream> {
        match self {
            File::Blob(f) => Ok(Box::new(Cursor::new(f.data.clone()))),
            File::FsRef(f) => {
                let file = tokio::fs::File::open(&f.fs_path).await?;
                Ok(Box::new(file))
            }
            File::Ref(f) => {
                let data = f.materialize().await?;
                Ok(Box::new(Cursor::new(data)))
            }
        }
    }
}

impl From<FileBlob> for File {
    fn from(value: FileBlob) -> Self {
        File::Blob(value)
    }
}

impl From<FileFsRef> for File {
    fn from(value: FileFsRef) -> Self {
        File::FsRef(value)
    }
}

impl From<FileRef> for File {
    fn from(value: FileRef) -> Self {
        File::Ref(value)
    }
}

/// In-memory file content.
#[derive(Debug, Clone)]
pub struct FileBlob {
    pub data: Bytes,
    pub mode: u32,
    pub content_type: Option<String>,
}

impl FileBlob {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            mode: DEFAULT_FILE_MODE,
            content_type: None,
        }
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Reference to a file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileFsRef {
    pub fs_path: PathBuf,
    pub mode: u32,
    pub content_type: Option<String>,
}

impl FileFsRef {
    /// Reference `fs_path` with the default file mode.
    pub fn new(fs_path: impl Into<PathBuf>) -> Self {
        Self {
            fs_path: fs_path.into(),
            mode: DEFAULT_FILE_MODE,
            content_type: None,
        }
    }

    /// Reference `fs_path`, capturing mode bits from disk metadata.
    pub async fn from_fs_path(fs_path: impl Into<PathBuf>) -> Result<Self> {
        let fs_path = fs_path.into();
        let metadata = tokio::fs::metadata(&fs_path).await?;
        Ok(Self {
            fs_path,
            mode: mode_from_metadata(&metadata),
            content_type: None,
        })
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[cfg(unix)]
pub(crate) fn mode_from_metadata(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
pub(crate) fn mode_from_metadata(_metadata: &std::fs::Metadata) -> u32 {
    DEFAULT_FILE_MODE
}

/// Reference to remote content, fetched on first asynchronous access.
///
/// The fetched bytes are memoized so that every stream acquisition after
/// the first reads the same content.
#[derive(Debug, Clone)]
pub struct FileRef {
    pub url: String,
    pub mode: u32,
    pub content_type: Option<String>,
    cached: Arc<OnceCell<Bytes>>,
}

impl FileRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: DEFAULT_FILE_MODE,
            content_type: None,
            cached: Arc::new(OnceCell::new()),
        }
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    async fn materialize(&self) -> Result<Bytes> {
        let data = self
            .cached
            .get_or_try_init(|| async {
                tracing::debug!(url = %self.url, "fetching remote file");
                let response = reqwest::get(&self.url)
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|source| FileError::Fetch {
                        url: self.url.clone(),
                        source,
                    })?;
                response.bytes().await.map_err(|source| FileError::Fetch {
                    url: self.url.clone(),
                    source,
                })
            })
            .await?;
        Ok(data.clone())
    }
}
