//! Cache preparer

use crate::stage::{BuildRequest, stage_in};
use crate::{Error, Result};
use fnpack_build_utils::{FileSet, Installer, glob};
use std::path::Path;

/// Files worth persisting between builds, relative to the cache directory
pub const CACHE_PATTERNS: [&str; 6] = [
    "user/node_modules/**",
    "user/package-lock.json",
    "user/yarn.lock",
    "ncc/node_modules/**",
    "ncc/package-lock.json",
    "ncc/yarn.lock",
];

/// Dependency trees and lockfiles selected from a staged cache directory
pub type CacheManifest = FileSet;

/// Stage `request` into `cache_path` and select the files to persist.
///
/// `request.work_path` is ignored. Anything staged that does not match
/// [`CACHE_PATTERNS`] stays on disk but is not part of the manifest.
pub async fn prepare_cache(
    request: &BuildRequest,
    cache_path: &Path,
    installer: &dyn Installer,
    ncc_version: &str,
    installer_args: &[String],
) -> Result<CacheManifest> {
    stage_in(request, cache_path, installer, ncc_version, installer_args).await?;

    let mut manifest = CacheManifest::new();
    for pattern in CACHE_PATTERNS {
        let matched = glob(pattern, cache_path).map_err(|source| Error::Cache { source })?;
        manifest.extend(matched);
    }

    tracing::info!(
        cache_path = %cache_path.display(),
        files = manifest.len(),
        "Prepared dependency cache"
    );
    Ok(manifest)
}
