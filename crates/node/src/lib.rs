//! Node.js function builder for fnpack
//!
//! Turns a set of source files and an entrypoint into a deployable lambda:
//! - [`stage`]: materializes user files and installs both the user's
//!   dependencies and the pinned `@zeit/ncc` bundler
//! - [`Assembler`]: runs the optional `now-build` script, bundles the
//!   entrypoint and lays out `launcher.js`, `bridge.js` and `user/<entry>`
//! - [`prepare_cache`]: stages into a cache directory and selects the
//!   dependency trees and lockfiles worth persisting
//!
//! [`NodeBuilder`] ties these together with injected collaborators.
//!
//! # Example
//!
//! ```rust,no_run
//! use fnpack_build_utils::{FileBlob, FileSet};
//! use fnpack_node::{BuildRequest, NodeBuilder};
//!
//! # async fn run() -> fnpack_node::Result<()> {
//! let mut files = FileSet::new();
//! files.insert("index.js", FileBlob::new("module.exports = (req, res) => res.end('ok')"));
//! files.insert("package.json", FileBlob::new("{}"));
//!
//! let request = BuildRequest::new(files, "index.js", "/tmp/fnpack-work");
//! let output = NodeBuilder::default().build(&request).await?;
//! assert_eq!(output["index.js"].handler(), "launcher.launcher");
//! # Ok(())
//! # }
//! ```

// TODO(node-docs): Add # Errors documentation to all fallible public functions
#![expect(
    clippy::missing_errors_doc,
    reason = "Error documentation to be added incrementally"
)]

mod error;

pub mod assemble;
pub mod builder;
pub mod bundler;
pub mod cache;
pub mod options;
pub mod stage;
pub mod template;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result, StagingPhase};

pub use assemble::{Assembler, BRIDGE_FILE, HANDLER, LAUNCHER_FILE, RUNTIME};
pub use builder::{BuildOutput, NodeBuilder};
pub use bundler::{Bundler, NccBundler};
pub use cache::{CACHE_PATTERNS, CacheManifest, prepare_cache};
pub use options::{BuilderConfig, BuilderOptions};
pub use stage::{BuildRequest, StagingResult, stage};
