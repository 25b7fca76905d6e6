//! Deployable artifact descriptors

use crate::file::FileSet;
use crate::materialize::materialize;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File written next to materialized artifact files
pub const ARTIFACT_SUMMARY_FILE: &str = "artifact.json";

/// A sealed, deployable function artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    files: FileSet,
    handler: String,
    runtime: String,
}

impl ArtifactDescriptor {
    /// Seal `files` with the handler reference and runtime tag
    #[must_use]
    pub fn new(files: FileSet, handler: impl Into<String>, runtime: impl Into<String>) -> Self {
        Self {
            files,
            handler: handler.into(),
            runtime: runtime.into(),
        }
    }

    /// Files shipped in the artifact
    #[must_use]
    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// `<file>.<export>` reference of the entry function
    #[must_use]
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Runtime the artifact targets
    #[must_use]
    pub fn runtime(&self) -> &str {
        &self.runtime
    }

    /// Total size of all files in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.files.total_size()
    }

    /// Fail with [`Error::SizeExceeded`] if the artifact is over `limit` bytes
    pub fn check_size(&self, limit: u64) -> Result<()> {
        let size = self.size();
        if size > limit {
            Err(Error::SizeExceeded { size, limit })
        } else {
            Ok(())
        }
    }

    /// Describe the artifact with per-file digests
    pub async fn summary(&self) -> Result<ArtifactSummary> {
        let mut files = Vec::with_capacity(self.files.len());
        for (path, file) in self.files.iter() {
            files.push(ArtifactFileSummary {
                path: path.to_string(),
                size: file.size(),
                mode: file.mode(),
                sha256: file.digest().await?,
            });
        }
        Ok(ArtifactSummary {
            handler: self.handler.clone(),
            runtime: self.runtime.clone(),
            size: self.size(),
            files,
        })
    }

    /// Write the artifact files and an [`ARTIFACT_SUMMARY_FILE`] under `directory`
    pub async fn write_to(&self, directory: &Path) -> Result<ArtifactSummary> {
        materialize(&self.files, directory).await?;

        let summary = self.summary().await?;
        let path = directory.join(ARTIFACT_SUMMARY_FILE);
        let json = serde_json::to_vec_pretty(&summary)
            .map_err(|e| Error::manifest(&path, e.to_string()))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| Error::io(e, &path, "write"))?;
        Ok(summary)
    }
}

/// Serializable description of an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    /// Handler reference
    pub handler: String,
    /// Runtime tag
    pub runtime: String,
    /// Total size in bytes
    pub size: u64,
    /// Shipped files in path order
    pub files: Vec<ArtifactFileSummary>,
}

/// One file of an [`ArtifactSummary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFileSummary {
    /// Path inside the artifact
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Permission bits
    pub mode: u32,
    /// Hex SHA-256 of the contents
    pub sha256: String,
}

/// Parse a human readable size such as `"5mb"` into bytes (1024-based)
pub fn parse_size(value: &str) -> Result<u64> {
    let normalized = value.trim().to_ascii_lowercase();
    let split = normalized
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(normalized.len());
    let (number, unit) = normalized.split_at(split);

    let multiplier: u64 = match unit.trim() {
        "" | "b" => 1,
        "kb" => 1024,
        "mb" => 1024 * 1024,
        "gb" => 1024 * 1024 * 1024,
        _ => {
            return Err(Error::InvalidSize {
                value: value.to_string(),
            });
        }
    };
    number
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(|| Error::InvalidSize {
            value: value.to_string(),
        })
}
