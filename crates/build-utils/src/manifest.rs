//! Minimal `package.json` model

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the npm package manifest
pub const PACKAGE_JSON: &str = "package.json";

/// File name of the npm lockfile
pub const PACKAGE_LOCK: &str = "package-lock.json";

/// File name of the yarn lockfile
pub const YARN_LOCK: &str = "yarn.lock";

/// The subset of `package.json` the builders read or write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageJson {
    /// Package name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Runtime dependencies
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
    /// Named lifecycle scripts
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scripts: BTreeMap<String, String>,
}

impl PackageJson {
    /// A manifest declaring exactly one dependency
    #[must_use]
    pub fn with_dependency(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            dependencies: BTreeMap::from([(name.into(), version.into())]),
            ..Self::default()
        }
    }

    /// Read `package.json` from `directory`, `None` if it does not exist
    pub async fn read(directory: &Path) -> Result<Option<Self>> {
        let path = directory.join(PACKAGE_JSON);
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(e, &path, "read")),
        };
        serde_json::from_slice(&contents)
            .map(Some)
            .map_err(|e| Error::manifest(&path, e.to_string()))
    }

    /// Whether a script named `name` is declared
    #[must_use]
    pub fn has_script(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    /// Serialize to compact JSON
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Error::manifest(PACKAGE_JSON, e.to_string()))
    }
}

/// Package manager used for a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// npm, chosen when a `package-lock.json` is present
    Npm,
    /// yarn, the default otherwise
    Yarn,
}

impl PackageManager {
    /// Pick the package manager for `directory` from its lockfiles
    #[must_use]
    pub fn detect(directory: &Path) -> Self {
        if directory.join(PACKAGE_LOCK).is_file() {
            Self::Npm
        } else {
            Self::Yarn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_single_dependency_manifest_json() {
        let manifest = PackageJson::with_dependency("@zeit/ncc", "0.1.3-webpack");
        assert_eq!(
            String::from_utf8(manifest.to_vec().unwrap()).unwrap(),
            r#"{"dependencies":{"@zeit/ncc":"0.1.3-webpack"}}"#
        );
    }

    #[tokio::test]
    async fn test_read_ignores_unknown_fields() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(PACKAGE_JSON),
            r#"{"name":"app","version":"1.0.0","scripts":{"now-build":"tsc"},"engines":{"node":"8"}}"#,
        )
        .unwrap();

        let manifest = PackageJson::read(tmp.path()).await.unwrap().unwrap();
        assert_eq!(manifest.name.as_deref(), Some("app"));
        assert!(manifest.has_script("now-build"));
        assert!(!manifest.has_script("build"));
    }

    #[tokio::test]
    async fn test_read_missing_manifest() {
        let tmp = TempDir::new().unwrap();
        assert!(PackageJson::read(tmp.path()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_invalid_manifest() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(PACKAGE_JSON), "{ not json").unwrap();

        let err = PackageJson::read(tmp.path()).await.unwrap_err();
        assert!(matches!(err, Error::Manifest { .. }));
    }

    #[test]
    fn test_detect_package_manager() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(PackageManager::detect(tmp.path()), PackageManager::Yarn);

        std::fs::write(tmp.path().join(PACKAGE_LOCK), "{}").unwrap();
        assert_eq!(PackageManager::detect(tmp.path()), PackageManager::Npm);
    }
}
