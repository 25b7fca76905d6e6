use fnpack_build_utils::Error as BuildError;
use fnpack_node::{BuildRequest, BuilderOptions, CacheManifest, NodeBuilder};
use serde::Serialize;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// One cacheable file as written to the manifest listing
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CacheEntry<'a> {
    pub path: &'a str,
    pub size: u64,
    pub mode: u32,
}

pub fn listing(manifest: &CacheManifest) -> Vec<CacheEntry<'_>> {
    manifest
        .iter()
        .map(|(path, file)| CacheEntry {
            path,
            size: file.size(),
            mode: file.mode(),
        })
        .collect()
}

pub async fn execute(
    options: BuilderOptions,
    source: &Path,
    entrypoint: String,
    cache_path: &Path,
    manifest_out: Option<&Path>,
) -> miette::Result<()> {
    let files = super::read_source(source)?;
    let request = BuildRequest::new(files, entrypoint, cache_path);
    let manifest = NodeBuilder::new(options)
        .prepare_cache(&request, cache_path)
        .await?;
    info!(cache_path = %cache_path.display(), files = manifest.len(), "prepared cache");

    let mut json = serde_json::to_vec_pretty(&listing(&manifest))
        .map_err(|e| miette::miette!("Failed to serialize cache manifest: {e}"))?;
    json.push(b'\n');

    match manifest_out {
        Some(path) => tokio::fs::write(path, &json)
            .await
            .map_err(|e| BuildError::io(e, path, "write cache manifest"))?,
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(&json)
                .await
                .map_err(|e| BuildError::io_no_path(e, "write cache manifest"))?;
            stdout
                .flush()
                .await
                .map_err(|e| BuildError::io_no_path(e, "flush stdout"))?;
        }
    }

    Ok(())
}
