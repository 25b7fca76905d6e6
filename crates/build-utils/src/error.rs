//! Error types for the build-utils crate

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for file, install and artifact operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error with path context
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(fnpack::build_utils::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "write", "create_dir_all")
        operation: String,
    },

    /// A file set key that cannot be placed under a target directory
    #[error("Invalid file path '{path}': {reason}")]
    #[diagnostic(
        code(fnpack::build_utils::invalid_path),
        help("File set keys must be relative POSIX paths without '..' components")
    )]
    InvalidPath {
        /// The offending key
        path: String,
        /// Why the key was rejected
        reason: String,
    },

    /// The entrypoint is not part of the input files
    #[error("Entrypoint '{entrypoint}' is not present in the input files")]
    #[diagnostic(code(fnpack::build_utils::entrypoint_not_found))]
    EntrypointNotFound {
        /// The requested entrypoint
        entrypoint: String,
    },

    /// The dependency installer exited unsuccessfully
    #[error("Dependency installation failed in {} (exit code {})", directory.display(), exit_code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    #[diagnostic(
        code(fnpack::build_utils::installation_failed),
        help("Inspect the installer output attached to this error")
    )]
    InstallationFailed {
        /// Directory the installer ran in
        directory: PathBuf,
        /// Exit code, `None` when terminated by a signal
        exit_code: Option<i32>,
        /// Captured stdout and stderr of the installer
        output: String,
    },

    /// A subprocess exited unsuccessfully
    #[error("Command `{command}` failed (exit code {})", exit_code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    #[diagnostic(code(fnpack::build_utils::command_failed))]
    CommandFailed {
        /// Rendered command line
        command: String,
        /// Exit code, `None` when terminated by a signal
        exit_code: Option<i32>,
        /// Captured stdout
        stdout: String,
        /// Captured stderr
        stderr: String,
    },

    /// A package manifest could not be read or parsed
    #[error("Invalid manifest {}: {message}", path.display())]
    #[diagnostic(code(fnpack::build_utils::manifest))]
    Manifest {
        /// Manifest location
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// A glob pattern was invalid or could not be walked
    #[error("Glob '{pattern}' failed: {message}")]
    #[diagnostic(code(fnpack::build_utils::glob))]
    Glob {
        /// The pattern being evaluated
        pattern: String,
        /// Underlying error message
        message: String,
    },

    /// An artifact is larger than the declared limit
    #[error("Artifact size {size} bytes exceeds the limit of {limit} bytes")]
    #[diagnostic(
        code(fnpack::build_utils::size_exceeded),
        help("Reduce the bundled output or the number of shipped files")
    )]
    SizeExceeded {
        /// Total artifact size in bytes
        size: u64,
        /// Limit in bytes
        limit: u64,
    },

    /// A human readable size could not be parsed
    #[error("Invalid size '{value}'")]
    #[diagnostic(
        code(fnpack::build_utils::invalid_size),
        help("Use a number with an optional b, kb, mb or gb suffix, e.g. \"5mb\"")
    )]
    InvalidSize {
        /// The rejected value
        value: String,
    },
}

impl Error {
    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create an I/O error without path context
    #[must_use]
    pub fn io_no_path(source: std::io::Error, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: None,
            operation: operation.into(),
        }
    }

    /// Create an invalid path error
    #[must_use]
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a manifest error
    #[must_use]
    pub fn manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a glob error
    #[must_use]
    pub fn glob(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Glob {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

/// Result type for build-utils operations
pub type Result<T> = std::result::Result<T, Error>;
