//! Collecting on-disk files into a [`FileSet`]

use crate::file::{FileFsRef, FileSet};
use crate::{Error, Result};
use std::path::Path;

/// Collect every regular file under `base` matching `pattern`.
///
/// The pattern is relative to `base` and keys of the returned set are the
/// matched paths relative to `base`, POSIX separated. Directories are never
/// included. Leading dots are matched like any other character, so entries
/// such as `node_modules/.bin` are part of a `node_modules/**` match.
/// A trailing `**` matches every file below that directory.
pub fn glob(pattern: &str, base: &Path) -> Result<FileSet> {
    let base_str = base
        .to_str()
        .ok_or_else(|| Error::glob(pattern, format!("base {} is not UTF-8", base.display())))?;
    // `**` on its own only yields directories
    let file_pattern = if pattern == "**" || pattern.ends_with("/**") {
        format!("{pattern}/*")
    } else {
        pattern.to_string()
    };
    let full_pattern = format!(
        "{}/{}",
        ::glob::Pattern::escape(base_str.trim_end_matches('/')),
        file_pattern
    );

    let entries = ::glob::glob_with(&full_pattern, ::glob::MatchOptions::new())
        .map_err(|e| Error::glob(pattern, e.to_string()))?;

    let mut files = FileSet::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::glob(pattern, e.to_string()))?;
        if !path.is_file() {
            continue;
        }
        let Some(key) = relative_key(&path, base) else {
            continue;
        };
        files.insert(key, FileFsRef::from_path(&path)?);
    }

    tracing::debug!(pattern, base = %base.display(), matched = files.len(), "Glob complete");
    Ok(files)
}

/// Read a whole directory tree into a [`FileSet`] of on-disk references.
///
/// Directories whose name appears in `excluded_dirs` are skipped entirely
/// (for example `node_modules`).
pub fn read_tree(root: &Path, excluded_dirs: &[&str]) -> Result<FileSet> {
    let walker = walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && entry.depth() > 0
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| excluded_dirs.contains(&name)))
        });

    let mut files = FileSet::new();
    for entry in walker {
        let entry = entry.map_err(|e| Error::io(std::io::Error::from(e), root, "walk"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(key) = relative_key(entry.path(), root) {
            files.insert(key, FileFsRef::from_path(entry.path())?);
        }
    }
    Ok(files)
}

fn relative_key(path: &Path, base: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
