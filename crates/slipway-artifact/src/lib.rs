//! # slipway-artifact
//!
//! Foundation crate for the Slipway build output contract.
//!
//! Provides the polymorphic [`File`] abstraction (in-memory blob, filesystem
//! reference, remote reference) with unified streaming access, the [`Files`]
//! project snapshot, and the closed [`Output`] union of everything a builder
//! may produce: static files, packaged functions, edge functions, and
//! prerendered pages.
//!
//! ## Quick Start
//!
//! ```no_run
//! use slipway_artifact::{File, FileBlob, Lambda, Output};
//!
//! # async fn example() -> slipway_artifact::Result<()> {
//! // An in-memory file, readable any number of times
//! let file = File::from(FileBlob::new("export default () => 'hi';"));
//! let mut stream = file.to_stream()?;
//!
//! // A packaged serverless function
//! let lambda = Lambda::new(Default::default(), "index.handler", "nodejs20.x")
//!     .memory(1024)
//!     .max_duration(30);
//! let artifact = Output::Lambda(lambda);
//! # Ok(())
//! # }
//! ```

mod edge_function;
mod error;
mod file;
mod files;
mod lambda;
mod output;
mod prerender;

pub use edge_function::EdgeFunction;
pub use error::{FileError, Result};
pub use file::{
    AsyncByteStream, ByteStream, File, FileBlob, FileFsRef, FileRef, StreamCapability,
    DEFAULT_FILE_MODE,
};
pub use files::{download_files, glob_files, Files};
pub use lambda::Lambda;
pub use output::Output;
pub use prerender::{Expiration, Prerender};
