//! File references and file sets
//!
//! A [`FileSet`] maps relative POSIX paths to [`FileRef`]s and is the value
//! passed between every stage of a build. A `FileRef` is either in-memory
//! bytes ([`FileBlob`]) or a file that already exists on disk
//! ([`FileFsRef`]); both are accepted anywhere a `FileRef` is expected.

use crate::{Error, Result};
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Mode used when a file carries no explicit permission bits
pub const DEFAULT_MODE: u32 = 0o100_644;

/// In-memory file contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    data: Bytes,
    mode: u32,
}

impl FileBlob {
    /// Create a blob with the default mode
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self::with_mode(data, DEFAULT_MODE)
    }

    /// Create a blob with explicit permission bits
    #[must_use]
    pub fn with_mode(data: impl Into<Bytes>, mode: u32) -> Self {
        Self {
            data: data.into(),
            mode,
        }
    }

    /// Borrow the blob contents
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// Reference to a file that already exists on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFsRef {
    fs_path: PathBuf,
    mode: u32,
    size: u64,
}

impl FileFsRef {
    /// Create a reference from known metadata
    #[must_use]
    pub fn new(fs_path: impl Into<PathBuf>, mode: u32, size: u64) -> Self {
        Self {
            fs_path: fs_path.into(),
            mode,
            size,
        }
    }

    /// Create a reference by reading the metadata of `fs_path`
    pub fn from_path(fs_path: impl Into<PathBuf>) -> Result<Self> {
        let fs_path = fs_path.into();
        let metadata =
            std::fs::metadata(&fs_path).map_err(|e| Error::io(e, &fs_path, "metadata"))?;
        Ok(Self {
            mode: mode_of(&metadata),
            size: metadata.len(),
            fs_path,
        })
    }

    /// Location of the referenced file
    #[must_use]
    pub fn fs_path(&self) -> &Path {
        &self.fs_path
    }
}

#[cfg(unix)]
fn mode_of(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn mode_of(_metadata: &std::fs::Metadata) -> u32 {
    DEFAULT_MODE
}

/// How the bytes of a [`FileRef`] are retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retrieval {
    /// Held in memory
    Blob,
    /// Read from an on-disk path
    FsRef,
}

/// An immutable reference to file contents plus metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRef {
    /// In-memory bytes
    Blob(FileBlob),
    /// Existing on-disk file
    FsRef(FileFsRef),
}

impl FileRef {
    /// Shorthand for an in-memory file with the default mode
    #[must_use]
    pub fn blob(data: impl Into<Bytes>) -> Self {
        Self::Blob(FileBlob::new(data))
    }

    /// Permission bits
    #[must_use]
    pub fn mode(&self) -> u32 {
        match self {
            Self::Blob(blob) => blob.mode,
            Self::FsRef(fs_ref) => fs_ref.mode,
        }
    }

    /// Size in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        match self {
            Self::Blob(blob) => blob.data.len() as u64,
            Self::FsRef(fs_ref) => fs_ref.size,
        }
    }

    /// Retrieval method
    #[must_use]
    pub fn retrieval(&self) -> Retrieval {
        match self {
            Self::Blob(_) => Retrieval::Blob,
            Self::FsRef(_) => Retrieval::FsRef,
        }
    }

    /// Load the file contents
    pub async fn read(&self) -> Result<Bytes> {
        match self {
            Self::Blob(blob) => Ok(blob.data.clone()),
            Self::FsRef(fs_ref) => tokio::fs::read(&fs_ref.fs_path)
                .await
                .map(Bytes::from)
                .map_err(|e| Error::io(e, &fs_ref.fs_path, "read")),
        }
    }

    /// Lowercase hex SHA-256 of the contents
    pub async fn digest(&self) -> Result<String> {
        let data = self.read().await?;
        Ok(hex::encode(Sha256::digest(&data)))
    }
}

impl From<FileBlob> for FileRef {
    fn from(blob: FileBlob) -> Self {
        Self::Blob(blob)
    }
}

impl From<FileFsRef> for FileRef {
    fn from(fs_ref: FileFsRef) -> Self {
        Self::FsRef(fs_ref)
    }
}

/// Mapping from relative POSIX paths to file references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    files: BTreeMap<String, FileRef>,
}

impl FileSet {
    /// Create an empty file set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file, replacing any previous entry for `path`
    pub fn insert(&mut self, path: impl Into<String>, file: impl Into<FileRef>) -> Option<FileRef> {
        self.files.insert(path.into(), file.into())
    }

    /// Look up a file by path
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FileRef> {
        self.files.get(path)
    }

    /// Whether `path` is present
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Entries in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileRef)> {
        self.files.iter().map(|(path, file)| (path.as_str(), file))
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the set has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of all file sizes in bytes
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.values().map(FileRef::size).sum()
    }
}

impl<P: Into<String>, F: Into<FileRef>> FromIterator<(P, F)> for FileSet {
    fn from_iter<I: IntoIterator<Item = (P, F)>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<P: Into<String>, F: Into<FileRef>> Extend<(P, F)> for FileSet {
    fn extend<I: IntoIterator<Item = (P, F)>>(&mut self, iter: I) {
        for (path, file) in iter {
            self.insert(path, file);
        }
    }
}

impl IntoIterator for FileSet {
    type Item = (String, FileRef);
    type IntoIter = std::collections::btree_map::IntoIter<String, FileRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

/// Check that `key` can be safely joined onto a target directory.
///
/// Keys are untrusted input: absolute paths, `..` components and Windows
/// separators are rejected so materialization never escapes its target.
pub fn validate_relative_path(key: &str) -> Result<&Path> {
    if key.is_empty() {
        return Err(Error::invalid_path(key, "path is empty"));
    }
    if key.contains('\\') {
        return Err(Error::invalid_path(key, "backslashes are not allowed"));
    }
    let path = Path::new(key);
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(Error::invalid_path(key, "'..' components are not allowed"));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::invalid_path(key, "path must be relative"));
            }
        }
    }
    Ok(path)
}

/// Join relative POSIX segments with `/`, skipping empty and `.` segments
#[must_use]
pub fn posix_join(segments: &[&str]) -> String {
    segments
        .iter()
        .flat_map(|segment| segment.split('/'))
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Directory part of a relative POSIX path, `""` for top-level files
#[must_use]
pub fn posix_dirname(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..idx])
}
