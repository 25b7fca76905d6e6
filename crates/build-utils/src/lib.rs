//! Building blocks for fnpack builders
//!
//! This crate provides the pieces a language builder composes into a
//! build pipeline:
//! - [`FileRef`] / [`FileSet`]: the file model passed between stages
//! - [`materialize`]: writing a file set onto disk
//! - [`glob()`] and [`read_tree`]: collecting on-disk files into a file set
//! - [`Installer`]: dependency installation (npm / yarn)
//! - [`ScriptRunner`]: `package.json` lifecycle scripts
//! - [`ArtifactDescriptor`]: the sealed, deployable output
//!
//! Every subprocess is spawned with `kill_on_drop`, so dropping a build
//! future terminates its children.

// TODO(build-utils-docs): Add # Errors documentation to all fallible public functions
#![expect(
    clippy::missing_errors_doc,
    reason = "Error documentation to be added incrementally"
)]

mod error;

pub mod artifact;
pub mod file;
pub mod glob;
pub mod install;
pub mod manifest;
pub mod materialize;
pub mod process;
pub mod scripts;

pub use error::{Error, Result};

pub use artifact::{ArtifactDescriptor, ArtifactFileSummary, ArtifactSummary, parse_size};
pub use file::{FileBlob, FileFsRef, FileRef, FileSet, Retrieval};
pub use self::glob::{glob, read_tree};
pub use install::{Installer, NpmInstaller, PREFER_OFFLINE};
pub use manifest::{PackageJson, PackageManager};
pub use materialize::materialize;
pub use process::{CommandOutput, run_checked, run_command};
pub use scripts::{PackageJsonScripts, ScriptRunner};
