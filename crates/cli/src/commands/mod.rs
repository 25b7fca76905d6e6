pub mod build;
pub mod prepare_cache;

use fnpack_node::BuilderOptions;
use std::path::{Path, PathBuf};

/// Internal command representation, decoupled from clap
#[derive(Debug, Clone)]
pub enum Command {
    Build {
        source: PathBuf,
        entrypoint: String,
        work_path: PathBuf,
        out: PathBuf,
    },
    PrepareCache {
        source: PathBuf,
        entrypoint: String,
        cache_path: PathBuf,
        manifest: Option<PathBuf>,
    },
}

/// Global settings shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub node: Option<String>,
    pub options: Option<PathBuf>,
}

impl GlobalArgs {
    /// Resolve builder options: the options file, then the `--node` override
    pub fn builder_options(&self) -> fnpack_node::Result<BuilderOptions> {
        let mut options = match &self.options {
            Some(path) => BuilderOptions::from_file(path)?,
            None => BuilderOptions::default(),
        };
        if let Some(node) = &self.node {
            options.node_binary.clone_from(node);
        }
        Ok(options)
    }
}

pub async fn execute(command: Command, globals: &GlobalArgs) -> miette::Result<()> {
    let options = globals.builder_options()?;
    match command {
        Command::Build {
            source,
            entrypoint,
            work_path,
            out,
        } => build::execute(options, &source, entrypoint, work_path, &out).await,
        Command::PrepareCache {
            source,
            entrypoint,
            cache_path,
            manifest,
        } => {
            prepare_cache::execute(options, &source, entrypoint, &cache_path, manifest.as_deref())
                .await
        }
    }
}

/// Read the source tree the way the orchestrator hands it to a builder
pub(crate) fn read_source(source: &Path) -> fnpack_build_utils::Result<fnpack_build_utils::FileSet> {
    fnpack_build_utils::read_tree(source, &["node_modules"])
}
