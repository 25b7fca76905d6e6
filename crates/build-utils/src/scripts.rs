//! Running lifecycle scripts declared in `package.json`

use crate::manifest::{PackageJson, PackageManager};
use crate::process::run_checked;
use crate::Result;
use async_trait::async_trait;
use std::path::Path;

/// Runs a named script from the manifest in a directory
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Run `script` in `directory` if its manifest declares it.
    ///
    /// Returns `Ok(false)` when there is no manifest or the script is not
    /// declared, `Ok(true)` after a successful run.
    async fn run_script(&self, directory: &Path, script: &str) -> Result<bool>;
}

/// Script runner using `npm run` or `yarn run`
#[derive(Debug, Clone)]
pub struct PackageJsonScripts {
    npm: String,
    yarn: String,
}

impl Default for PackageJsonScripts {
    fn default() -> Self {
        Self::with_programs("npm", "yarn")
    }
}

impl PackageJsonScripts {
    /// Create a runner using `npm` and `yarn` from `PATH`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner with explicit executables
    #[must_use]
    pub fn with_programs(npm: impl Into<String>, yarn: impl Into<String>) -> Self {
        Self {
            npm: npm.into(),
            yarn: yarn.into(),
        }
    }
}

#[async_trait]
impl ScriptRunner for PackageJsonScripts {
    async fn run_script(&self, directory: &Path, script: &str) -> Result<bool> {
        let Some(manifest) = PackageJson::read(directory).await? else {
            tracing::debug!(directory = %directory.display(), "No package.json, skipping script");
            return Ok(false);
        };
        if !manifest.has_script(script) {
            tracing::debug!(script, "Script not declared, skipping");
            return Ok(false);
        }

        let program = match PackageManager::detect(directory) {
            PackageManager::Npm => &self.npm,
            PackageManager::Yarn => &self.yarn,
        };
        tracing::info!(script, program = %program, "Running package.json script");
        run_checked(program, &["run".to_string(), script.to_string()], directory).await?;
        Ok(true)
    }
}
