//! Error types for the Node.js builder

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

/// Step of the stage orchestrator that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingPhase {
    /// Writing the user's files under `user/`
    MaterializeUser,
    /// Installing the user's dependencies
    InstallUser,
    /// Writing the synthesized bundler manifest under `ncc/`
    MaterializeBundlerManifest,
    /// Installing the bundler itself
    InstallBundler,
}

impl StagingPhase {
    /// Stable tag used in logs and error messages
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MaterializeUser => "materialize-user",
            Self::InstallUser => "install-user",
            Self::MaterializeBundlerManifest => "materialize-bundler-manifest",
            Self::InstallBundler => "install-bundler",
        }
    }
}

impl fmt::Display for StagingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for Node.js builds
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Staging failed in the given phase
    #[error("Staging failed during {phase}: {source}")]
    #[diagnostic(
        code(fnpack::node::staging),
        help("The work directory is left on disk for inspection")
    )]
    Staging {
        /// Phase that failed
        phase: StagingPhase,
        /// Underlying cause
        #[source]
        source: fnpack_build_utils::Error,
    },

    /// The user's build script exited unsuccessfully
    #[error("User script '{script}' failed: {source}")]
    #[diagnostic(code(fnpack::node::user_script))]
    UserScript {
        /// Script name from package.json
        script: String,
        /// Underlying cause
        #[source]
        source: fnpack_build_utils::Error,
    },

    /// The bundler failed or produced no output
    #[error("Compilation failed: {message}")]
    #[diagnostic(code(fnpack::node::compile))]
    Compile {
        /// Bundler diagnostics
        message: String,
    },

    /// The launcher template does not contain its placeholder exactly once
    #[error("Launcher template must contain '{placeholder}' exactly once, found {occurrences}")]
    #[diagnostic(code(fnpack::node::template))]
    Template {
        /// The required placeholder token
        placeholder: String,
        /// How many times it was found
        occurrences: usize,
    },

    /// Selecting cache files failed after staging
    #[error("Cache selection failed: {source}")]
    #[diagnostic(code(fnpack::node::cache))]
    Cache {
        /// Underlying cause
        #[source]
        source: fnpack_build_utils::Error,
    },

    /// Builder configuration error
    #[error("Configuration error: {message}")]
    #[diagnostic(code(fnpack::node::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },
}

impl Error {
    /// Create a staging error for `phase`
    #[must_use]
    pub fn staging(phase: StagingPhase, source: fnpack_build_utils::Error) -> Self {
        Self::Staging { phase, source }
    }

    /// Create a compile error
    #[must_use]
    pub fn compile(message: impl Into<String>) -> Self {
        Self::Compile {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Staging phase, if this is a staging error
    #[must_use]
    pub fn phase(&self) -> Option<StagingPhase> {
        match self {
            Self::Staging { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

/// Result type for Node.js builder operations
pub type Result<T> = std::result::Result<T, Error>;
