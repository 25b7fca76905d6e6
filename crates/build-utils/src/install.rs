//! Dependency installation
//!
//! The [`Installer`] trait is the boundary the builders depend on; the
//! default [`NpmInstaller`] shells out to npm or yarn depending on the
//! lockfile present in the target directory.

use crate::manifest::PackageManager;
use crate::process::run_command;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::Path;

/// Argument asking the installer to prefer its local cache over the network
pub const PREFER_OFFLINE: &str = "--prefer-offline";

/// Resolves the dependencies declared by the manifest in a directory
#[async_trait]
pub trait Installer: Send + Sync {
    /// Install dependencies in `directory`, forwarding `args` to the tool.
    ///
    /// Must be safe to re-run against an already populated directory.
    async fn install(&self, directory: &Path, args: &[String]) -> Result<()>;

    /// Name of the installer, for logs
    fn name(&self) -> &'static str;
}

/// Installer backed by the `npm` and `yarn` executables
#[derive(Debug, Clone)]
pub struct NpmInstaller {
    npm: String,
    yarn: String,
}

impl Default for NpmInstaller {
    fn default() -> Self {
        Self::with_programs("npm", "yarn")
    }
}

impl NpmInstaller {
    /// Create an installer using `npm` and `yarn` from `PATH`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an installer with explicit executables
    #[must_use]
    pub fn with_programs(npm: impl Into<String>, yarn: impl Into<String>) -> Self {
        Self {
            npm: npm.into(),
            yarn: yarn.into(),
        }
    }

    fn command_for(&self, directory: &Path, args: &[String]) -> (&str, Vec<String>) {
        match PackageManager::detect(directory) {
            PackageManager::Npm => {
                // npm rejects yarn-only flags; keep the rest untouched
                let mut command_args = vec!["install".to_string()];
                command_args.extend(args.iter().filter(|a| *a != PREFER_OFFLINE).cloned());
                (self.npm.as_str(), command_args)
            }
            PackageManager::Yarn => {
                let mut command_args = vec!["--cwd".to_string(), directory.display().to_string()];
                command_args.extend(args.iter().cloned());
                (self.yarn.as_str(), command_args)
            }
        }
    }
}

#[async_trait]
impl Installer for NpmInstaller {
    async fn install(&self, directory: &Path, args: &[String]) -> Result<()> {
        let (program, command_args) = self.command_for(directory, args);
        tracing::info!(directory = %directory.display(), program, "Installing dependencies");

        let output = run_command(program, &command_args, directory).await?;
        if output.success {
            Ok(())
        } else {
            Err(Error::InstallationFailed {
                directory: directory.to_path_buf(),
                exit_code: output.exit_code,
                output: output.combined(),
            })
        }
    }

    fn name(&self) -> &'static str {
        "npm"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::manifest::PACKAGE_LOCK;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Write an executable that records its arguments and working directory
    fn fake_tool(dir: &Path, name: &str, exit_code: i32) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(
            &path,
            format!(
                "#!/bin/sh\necho \"{name} $*\" > \"$PWD/invocation.txt\"\necho failing install >&2\nexit {exit_code}\n"
            ),
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn installer(bin: &Path, exit_code: i32) -> NpmInstaller {
        NpmInstaller::with_programs(
            fake_tool(bin, "npm", exit_code).display().to_string(),
            fake_tool(bin, "yarn", exit_code).display().to_string(),
        )
    }

    #[tokio::test]
    async fn test_yarn_without_lockfile() {
        let bin = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();

        installer(bin.path(), 0)
            .install(project.path(), &[PREFER_OFFLINE.to_string()])
            .await
            .unwrap();

        let invocation = std::fs::read_to_string(project.path().join("invocation.txt")).unwrap();
        assert_eq!(
            invocation.trim(),
            format!("yarn --cwd {} --prefer-offline", project.path().display())
        );
    }

    #[tokio::test]
    async fn test_npm_with_lockfile_strips_prefer_offline() {
        let bin = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        std::fs::write(project.path().join(PACKAGE_LOCK), "{}").unwrap();

        installer(bin.path(), 0)
            .install(
                project.path(),
                &[PREFER_OFFLINE.to_string(), "--no-audit".to_string()],
            )
            .await
            .unwrap();

        let invocation = std::fs::read_to_string(project.path().join("invocation.txt")).unwrap();
        assert_eq!(invocation.trim(), "npm install --no-audit");
    }

    #[tokio::test]
    async fn test_non_zero_exit_maps_to_installation_failed() {
        let bin = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();

        let err = installer(bin.path(), 2)
            .install(project.path(), &[])
            .await
            .unwrap_err();

        match err {
            Error::InstallationFailed {
                directory,
                exit_code,
                output,
            } => {
                assert_eq!(directory, project.path());
                assert_eq!(exit_code, Some(2));
                assert!(output.contains("failing install"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
