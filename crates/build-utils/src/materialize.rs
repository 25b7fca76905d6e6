//! Writes a [`FileSet`] onto disk

use crate::file::{FileRef, FileSet, validate_relative_path};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Materialize every file of `files` under `target`.
///
/// All keys are validated before anything is written, so an invalid key
/// leaves the target untouched. Parent directories are created as needed
/// and permission bits are applied on unix. Returns the on-disk location of
/// each key.
pub async fn materialize(files: &FileSet, target: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let mut placements = Vec::with_capacity(files.len());
    for (key, file) in files.iter() {
        let relative = validate_relative_path(key)?;
        placements.push((key, file, target.join(relative)));
    }

    tokio::fs::create_dir_all(target)
        .await
        .map_err(|e| Error::io(e, target, "create_dir_all"))?;

    let mut on_disk = BTreeMap::new();
    for (key, file, destination) in placements {
        write_file(file, &destination).await?;
        tracing::trace!(path = %key, destination = %destination.display(), "Materialized file");
        on_disk.insert(key.to_string(), destination);
    }

    tracing::debug!(
        count = on_disk.len(),
        target = %target.display(),
        "Materialized file set"
    );
    Ok(on_disk)
}

async fn write_file(file: &FileRef, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(e, parent, "create_dir_all"))?;
    }

    match file {
        FileRef::Blob(blob) => tokio::fs::write(destination, blob.data())
            .await
            .map_err(|e| Error::io(e, destination, "write"))?,
        FileRef::FsRef(fs_ref) => {
            if fs_ref.fs_path() != destination {
                tokio::fs::copy(fs_ref.fs_path(), destination)
                    .await
                    .map_err(|e| Error::io(e, destination, "copy"))?;
            }
        }
    }

    apply_mode(destination, file.mode()).await
}

#[cfg(unix)]
async fn apply_mode(destination: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let permissions = std::fs::Permissions::from_mode(mode & 0o7777);
    tokio::fs::set_permissions(destination, permissions)
        .await
        .map_err(|e| Error::io(e, destination, "set_permissions"))
}

#[cfg(not(unix))]
async fn apply_mode(_destination: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{FileBlob, FileFsRef};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_materialize_nested_files() {
        let tmp = TempDir::new().unwrap();
        let mut files = FileSet::new();
        files.insert("index.js", FileRef::blob("module.exports = 1"));
        files.insert("lib/util/helper.js", FileRef::blob("exports.x = 2"));

        let on_disk = materialize(&files, &tmp.path().join("user")).await.unwrap();

        assert_eq!(on_disk.len(), 2);
        assert_eq!(on_disk["index.js"], tmp.path().join("user/index.js"));
        assert_eq!(
            std::fs::read_to_string(&on_disk["lib/util/helper.js"]).unwrap(),
            "exports.x = 2"
        );
    }

    #[tokio::test]
    async fn test_materialize_copies_fs_refs() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source.txt");
        std::fs::write(&source, "copied").unwrap();

        let mut files = FileSet::new();
        files.insert("copy.txt", FileFsRef::from_path(&source).unwrap());

        let on_disk = materialize(&files, &tmp.path().join("out")).await.unwrap();
        assert_eq!(std::fs::read_to_string(&on_disk["copy.txt"]).unwrap(), "copied");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_materialize_applies_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let mut files = FileSet::new();
        files.insert("run.sh", FileBlob::with_mode("#!/bin/sh\n", 0o100_755));

        let on_disk = materialize(&files, tmp.path()).await.unwrap();
        let mode = std::fs::metadata(&on_disk["run.sh"]).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[tokio::test]
    async fn test_invalid_key_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("user");
        let mut files = FileSet::new();
        files.insert("ok.js", FileRef::blob("ok"));
        files.insert("../escape.js", FileRef::blob("nope"));

        let err = materialize(&files, &target).await.unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
        assert!(!target.exists());
        assert!(!tmp.path().join("escape.js").exists());
    }

    #[tokio::test]
    async fn test_rematerialize_overwrites() {
        let tmp = TempDir::new().unwrap();
        let mut files = FileSet::new();
        files.insert("package.json", FileRef::blob("{}"));
        materialize(&files, tmp.path()).await.unwrap();

        files.insert("package.json", FileRef::blob(r#"{"name":"x"}"#));
        let on_disk = materialize(&files, tmp.path()).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(&on_disk["package.json"]).unwrap(),
            r#"{"name":"x"}"#
        );
    }
}
