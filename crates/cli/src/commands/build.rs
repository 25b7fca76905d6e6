use fnpack_node::{BuildRequest, BuilderOptions, NodeBuilder};
use std::path::{Path, PathBuf};
use tracing::info;

pub async fn execute(
    options: BuilderOptions,
    source: &Path,
    entrypoint: String,
    work_path: PathBuf,
    out: &Path,
) -> miette::Result<()> {
    let files = super::read_source(source)?;
    info!(source = %source.display(), files = files.len(), "read source tree");

    let request = BuildRequest::new(files, entrypoint, work_path);
    let builder = NodeBuilder::new(options);
    let output = builder.build(&request).await?;
    let limit = builder.config().max_lambda_size_bytes()?;

    for (entrypoint, artifact) in &output {
        artifact.check_size(limit)?;
        let summary = artifact.write_to(out).await?;
        info!(
            entrypoint = %entrypoint,
            handler = %summary.handler,
            runtime = %summary.runtime,
            size = summary.size,
            out = %out.display(),
            "wrote artifact"
        );
    }

    Ok(())
}
