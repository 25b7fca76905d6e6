//! Stage orchestrator
//!
//! Puts the user's files and both dependency trees on disk:
//!
//! 1. materialize the input files under `<work>/user`
//! 2. install the user's dependencies next to the entrypoint
//! 3. write a manifest pinning the bundler under `<work>/ncc`
//! 4. install the bundler
//!
//! Each step reads what the previous one wrote, so they run strictly in
//! order. Nothing is cleaned up on failure.

use crate::error::StagingPhase;
use crate::{Error, Result};
use fnpack_build_utils::file::posix_dirname;
use fnpack_build_utils::manifest::PACKAGE_JSON;
use fnpack_build_utils::{FileBlob, FileSet, Installer, PackageJson, materialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Subdirectory of the work path holding the user's files
pub const USER_DIR: &str = "user";

/// Subdirectory of the work path holding the bundler install
pub const BUNDLER_DIR: &str = "ncc";

/// npm package name of the bundler
pub const NCC_PACKAGE: &str = "@zeit/ncc";

/// Input of one build
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// User files keyed by relative path
    pub files: FileSet,
    /// Key of `files` that is the function entrypoint
    pub entrypoint: String,
    /// Directory exclusively owned by this build
    pub work_path: PathBuf,
}

impl BuildRequest {
    /// Create a request
    #[must_use]
    pub fn new(files: FileSet, entrypoint: impl Into<String>, work_path: impl Into<PathBuf>) -> Self {
        Self {
            files,
            entrypoint: entrypoint.into(),
            work_path: work_path.into(),
        }
    }
}

/// Locations produced by [`stage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingResult {
    files_on_disk: BTreeMap<String, PathBuf>,
    bundler_root: PathBuf,
    entrypoint_dir: PathBuf,
}

impl StagingResult {
    /// Assemble a staging result from its parts
    #[must_use]
    pub fn new(
        files_on_disk: BTreeMap<String, PathBuf>,
        bundler_root: PathBuf,
        entrypoint_dir: PathBuf,
    ) -> Self {
        Self {
            files_on_disk,
            bundler_root,
            entrypoint_dir,
        }
    }

    /// Absolute location of every materialized user file
    #[must_use]
    pub fn files_on_disk(&self) -> &BTreeMap<String, PathBuf> {
        &self.files_on_disk
    }

    /// On-disk location of a user file
    #[must_use]
    pub fn file_on_disk(&self, path: &str) -> Option<&Path> {
        self.files_on_disk.get(path).map(PathBuf::as_path)
    }

    /// Install root of the bundler (`<work>/ncc`)
    #[must_use]
    pub fn bundler_root(&self) -> &Path {
        &self.bundler_root
    }

    /// Directory containing the user's entrypoint
    #[must_use]
    pub fn entrypoint_dir(&self) -> &Path {
        &self.entrypoint_dir
    }
}

/// Stage `request` in its own work path
pub async fn stage(
    request: &BuildRequest,
    installer: &dyn Installer,
    ncc_version: &str,
    installer_args: &[String],
) -> Result<StagingResult> {
    stage_in(request, &request.work_path, installer, ncc_version, installer_args).await
}

/// Stage `request` under `work_path`, ignoring `request.work_path`
pub(crate) async fn stage_in(
    request: &BuildRequest,
    work_path: &Path,
    installer: &dyn Installer,
    ncc_version: &str,
    installer_args: &[String],
) -> Result<StagingResult> {
    if !request.files.contains(&request.entrypoint) {
        return Err(Error::staging(
            StagingPhase::MaterializeUser,
            fnpack_build_utils::Error::EntrypointNotFound {
                entrypoint: request.entrypoint.clone(),
            },
        ));
    }

    let user_path = work_path.join(USER_DIR);
    let bundler_root = work_path.join(BUNDLER_DIR);

    tracing::info!(phase = %StagingPhase::MaterializeUser, target = %user_path.display(), "downloading user files");
    let files_on_disk = materialize(&request.files, &user_path)
        .await
        .map_err(|e| Error::staging(StagingPhase::MaterializeUser, e))?;

    let entrypoint_dir = match posix_dirname(&request.entrypoint) {
        "" => user_path.clone(),
        dir => user_path.join(dir),
    };

    tracing::info!(phase = %StagingPhase::InstallUser, directory = %entrypoint_dir.display(), installer = installer.name(), "running npm install for user");
    installer
        .install(&entrypoint_dir, installer_args)
        .await
        .map_err(|e| Error::staging(StagingPhase::InstallUser, e))?;

    tracing::info!(phase = %StagingPhase::MaterializeBundlerManifest, version = ncc_version, "writing ncc package.json");
    let manifest = bundler_manifest(ncc_version)
        .map_err(|e| Error::staging(StagingPhase::MaterializeBundlerManifest, e))?;
    materialize(&manifest, &bundler_root)
        .await
        .map_err(|e| Error::staging(StagingPhase::MaterializeBundlerManifest, e))?;

    tracing::info!(phase = %StagingPhase::InstallBundler, directory = %bundler_root.display(), installer = installer.name(), "running npm install for ncc");
    installer
        .install(&bundler_root, installer_args)
        .await
        .map_err(|e| Error::staging(StagingPhase::InstallBundler, e))?;

    Ok(StagingResult {
        files_on_disk,
        bundler_root,
        entrypoint_dir,
    })
}

/// A file set holding only a package.json that depends on the bundler
fn bundler_manifest(ncc_version: &str) -> fnpack_build_utils::Result<FileSet> {
    let manifest = PackageJson::with_dependency(NCC_PACKAGE, ncc_version).to_vec()?;
    let mut files = FileSet::new();
    files.insert(PACKAGE_JSON, FileBlob::new(manifest));
    Ok(files)
}
