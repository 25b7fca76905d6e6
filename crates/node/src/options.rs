//! Builder options and capability metadata

use crate::{Error, Result};
use fnpack_build_utils::PREFER_OFFLINE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bundler version pinned in the synthesized manifest
pub const DEFAULT_NCC_VERSION: &str = "0.1.3-webpack";

/// package.json script run before compilation
pub const DEFAULT_BUILD_SCRIPT: &str = "now-build";

/// Largest artifact the deployment target accepts
pub const MAX_LAMBDA_SIZE: &str = "5mb";

/// Tunables for a Node.js build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuilderOptions {
    /// Version of `@zeit/ncc` installed for bundling
    pub ncc_version: String,
    /// Name of the optional pre-build script in the user's package.json
    pub build_script: String,
    /// Installer arguments used on the build path
    pub build_installer_args: Vec<String>,
    /// Installer arguments used when preparing the cache
    pub cache_installer_args: Vec<String>,
    /// `node` executable used to drive the bundler
    pub node_binary: String,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            ncc_version: DEFAULT_NCC_VERSION.to_string(),
            build_script: DEFAULT_BUILD_SCRIPT.to_string(),
            build_installer_args: vec![PREFER_OFFLINE.to_string()],
            cache_installer_args: Vec::new(),
            node_binary: "node".to_string(),
        }
    }
}

impl BuilderOptions {
    /// Load options from a JSON file; missing fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read(path).map_err(|e| {
            Error::configuration(format!("Failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_slice(&contents).map_err(|e| {
            Error::configuration(format!("Failed to parse {}: {e}", path.display()))
        })
    }
}

/// Capability metadata advertised to the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderConfig {
    /// Advisory maximum artifact size, e.g. `"5mb"`
    pub max_lambda_size: &'static str,
}

impl BuilderConfig {
    /// The maximum artifact size in bytes
    pub fn max_lambda_size_bytes(&self) -> Result<u64> {
        fnpack_build_utils::parse_size(self.max_lambda_size)
            .map_err(|e| Error::configuration(e.to_string()))
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_lambda_size: MAX_LAMBDA_SIZE,
        }
    }
}
