//! Node.js builder facade
//!
//! [`NodeBuilder`] wires the stage orchestrator, the assembler and the
//! cache preparer to their external collaborators. Installer and script
//! runner are injected; the bundler is resolved from the staged `ncc`
//! directory unless one is passed to [`NodeBuilder::build_with`].

use crate::assemble::Assembler;
use crate::bundler::{Bundler, NccBundler};
use crate::cache::{CacheManifest, prepare_cache};
use crate::options::{BuilderConfig, BuilderOptions};
use crate::stage::{BuildRequest, StagingResult, stage};
use crate::Result;
use fnpack_build_utils::{ArtifactDescriptor, Installer, NpmInstaller, PackageJsonScripts, ScriptRunner};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Build output: the artifact keyed by the original entrypoint
pub type BuildOutput = BTreeMap<String, ArtifactDescriptor>;

/// Builds Node.js functions into lambda artifacts
#[derive(Clone)]
pub struct NodeBuilder {
    installer: Arc<dyn Installer>,
    scripts: Arc<dyn ScriptRunner>,
    assembler: Assembler,
    options: BuilderOptions,
}

impl std::fmt::Debug for NodeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeBuilder")
            .field("installer", &self.installer.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for NodeBuilder {
    fn default() -> Self {
        Self::new(BuilderOptions::default())
    }
}

impl NodeBuilder {
    /// Builder using npm/yarn from `PATH`
    #[must_use]
    pub fn new(options: BuilderOptions) -> Self {
        Self {
            installer: Arc::new(NpmInstaller::new()),
            scripts: Arc::new(PackageJsonScripts::new()),
            assembler: Assembler::new(options.build_script.clone()),
            options,
        }
    }

    /// Replace the dependency installer
    #[must_use]
    pub fn with_installer(mut self, installer: Arc<dyn Installer>) -> Self {
        self.installer = installer;
        self
    }

    /// Replace the package.json script runner
    #[must_use]
    pub fn with_scripts(mut self, scripts: Arc<dyn ScriptRunner>) -> Self {
        self.scripts = scripts;
        self
    }

    /// Options in effect
    #[must_use]
    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Capability metadata for the orchestrator
    #[must_use]
    pub fn config(&self) -> BuilderConfig {
        BuilderConfig::default()
    }

    /// Run the stage orchestrator for `request` with explicit installer arguments
    pub async fn stage(&self, request: &BuildRequest, installer_args: &[String]) -> Result<StagingResult> {
        stage(
            request,
            self.installer.as_ref(),
            &self.options.ncc_version,
            installer_args,
        )
        .await
    }

    /// Build `request`, bundling with the ncc installed during staging
    #[tracing::instrument(name = "build", skip(self, request), fields(entrypoint = %request.entrypoint))]
    pub async fn build(&self, request: &BuildRequest) -> Result<BuildOutput> {
        let staging = self.stage(request, &self.options.build_installer_args).await?;
        let bundler = NccBundler::resolve(staging.bundler_root(), self.options.node_binary.clone())?;
        self.finish(request, &staging, &bundler).await
    }

    /// Build `request` with a caller-supplied bundler
    pub async fn build_with(&self, request: &BuildRequest, bundler: &dyn Bundler) -> Result<BuildOutput> {
        let staging = self.stage(request, &self.options.build_installer_args).await?;
        self.finish(request, &staging, bundler).await
    }

    async fn finish(
        &self,
        request: &BuildRequest,
        staging: &StagingResult,
        bundler: &dyn Bundler,
    ) -> Result<BuildOutput> {
        let artifact = self
            .assembler
            .assemble(staging, &request.entrypoint, bundler, self.scripts.as_ref())
            .await?;
        Ok(BTreeMap::from([(request.entrypoint.clone(), artifact)]))
    }

    /// Warm the dependency cache at `cache_path` for `request`
    #[tracing::instrument(name = "prepare_cache", skip(self, request), fields(entrypoint = %request.entrypoint))]
    pub async fn prepare_cache(&self, request: &BuildRequest, cache_path: &Path) -> Result<CacheManifest> {
        prepare_cache(
            request,
            cache_path,
            self.installer.as_ref(),
            &self.options.ncc_version,
            &self.options.cache_installer_args,
        )
        .await
    }
}
