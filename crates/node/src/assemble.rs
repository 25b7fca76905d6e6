//! Artifact assembler
//!
//! Runs the optional user build script, bundles the entrypoint and lays out
//! the lambda:
//!
//! | path | contents |
//! |------|----------|
//! | `user/<entrypoint>` | bundled code |
//! | `launcher.js` | launcher template with the entry statements injected |
//! | `bridge.js` | runtime bridge |
//!
//! The bundled code keeps the entrypoint's relative path under `user/`;
//! deployed consumers locate it there.

use crate::bundler::Bundler;
use crate::options::DEFAULT_BUILD_SCRIPT;
use crate::stage::{StagingResult, USER_DIR};
use crate::template::{
    BRIDGE_SOURCE, LAUNCHER_TEMPLATE, LauncherTemplate, PLACEHOLDER, entry_statements,
};
use crate::{Error, Result};
use fnpack_build_utils::file::posix_join;
use fnpack_build_utils::{ArtifactDescriptor, FileBlob, FileSet, ScriptRunner};

/// Launcher file name inside the artifact
pub const LAUNCHER_FILE: &str = "launcher.js";

/// Bridge file name inside the artifact
pub const BRIDGE_FILE: &str = "bridge.js";

/// Handler reference: the `launcher` export of `launcher.js`
pub const HANDLER: &str = "launcher.launcher";

/// Runtime tag of produced artifacts
pub const RUNTIME: &str = "nodejs8.10";

/// Builds the final artifact from a staged work directory
#[derive(Debug, Clone)]
pub struct Assembler {
    launcher_template: String,
    bridge: String,
    build_script: String,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::with_resources(LAUNCHER_TEMPLATE, BRIDGE_SOURCE, DEFAULT_BUILD_SCRIPT)
    }
}

impl Assembler {
    /// Assembler using the shipped resources and `build_script` as the user hook
    #[must_use]
    pub fn new(build_script: impl Into<String>) -> Self {
        Self {
            build_script: build_script.into(),
            ..Self::default()
        }
    }

    /// Assembler with explicit launcher template and bridge sources
    #[must_use]
    pub fn with_resources(
        launcher_template: impl Into<String>,
        bridge: impl Into<String>,
        build_script: impl Into<String>,
    ) -> Self {
        Self {
            launcher_template: launcher_template.into(),
            bridge: bridge.into(),
            build_script: build_script.into(),
        }
    }

    /// Produce the artifact for `entrypoint` from `staging`
    pub async fn assemble(
        &self,
        staging: &StagingResult,
        entrypoint: &str,
        bundler: &dyn Bundler,
        scripts: &dyn ScriptRunner,
    ) -> Result<ArtifactDescriptor> {
        let entry_on_disk = staging.file_on_disk(entrypoint).ok_or_else(|| {
            Error::compile(format!("entrypoint '{entrypoint}' was not staged"))
        })?;

        tracing::info!(script = %self.build_script, directory = %staging.entrypoint_dir().display(), "running user script");
        scripts
            .run_script(staging.entrypoint_dir(), &self.build_script)
            .await
            .map_err(|source| Error::UserScript {
                script: self.build_script.clone(),
                source,
            })?;

        tracing::info!(entrypoint, "compiling entrypoint with ncc");
        let compiled = bundler.bundle(entry_on_disk).await?;
        if compiled.is_empty() {
            return Err(Error::compile(format!(
                "bundler produced no output for '{entrypoint}'"
            )));
        }

        tracing::info!(entrypoint, "preparing lambda files");
        let bundled_path = posix_join(&[USER_DIR, entrypoint]);
        let launcher = LauncherTemplate::new(&self.launcher_template, PLACEHOLDER)?
            .render(&entry_statements(&bundled_path));

        let mut files = FileSet::new();
        files.insert(bundled_path, FileBlob::new(compiled));
        files.insert(LAUNCHER_FILE, FileBlob::new(launcher));
        files.insert(BRIDGE_FILE, FileBlob::new(self.bridge.clone()));

        Ok(ArtifactDescriptor::new(files, HANDLER, RUNTIME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::stage;
    use crate::test_support::{FakeBundler, FakeInstaller, FakeScripts, example_request};
    use fnpack_build_utils::FileRef;
    use tempfile::TempDir;

    async fn staged(tmp: &TempDir) -> StagingResult {
        stage(&example_request(tmp.path()), &FakeInstaller::new(), "0.1.3-webpack", &[])
            .await
            .unwrap()
    }

    async fn text(file: &FileRef) -> String {
        String::from_utf8(file.read().await.unwrap().to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_artifact_has_exactly_three_files() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp).await;

        let artifact = Assembler::default()
            .assemble(&staging, "index.js", &FakeBundler::new(), &FakeScripts::new())
            .await
            .unwrap();

        assert_eq!(
            artifact.files().paths().collect::<Vec<_>>(),
            vec!["bridge.js", "launcher.js", "user/index.js"]
        );
        assert_eq!(artifact.handler(), "launcher.launcher");
        assert_eq!(artifact.runtime(), "nodejs8.10");
    }

    #[tokio::test]
    async fn test_bundled_code_stored_under_user_path() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp).await;
        let bundler = FakeBundler::new();

        let artifact = Assembler::default()
            .assemble(&staging, "index.js", &bundler, &FakeScripts::new())
            .await
            .unwrap();

        assert_eq!(bundler.calls(), vec![tmp.path().join("user/index.js")]);
        let code = text(artifact.files().get("user/index.js").unwrap()).await;
        assert!(code.starts_with("/* bundled */"));
        assert!(code.contains("res.end('ok')"));
    }

    #[tokio::test]
    async fn test_launcher_injects_statements_once() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp).await;

        let artifact = Assembler::default()
            .assemble(&staging, "index.js", &FakeBundler::new(), &FakeScripts::new())
            .await
            .unwrap();

        let launcher = text(artifact.files().get(LAUNCHER_FILE).unwrap()).await;
        assert!(!launcher.contains(PLACEHOLDER));
        assert!(launcher.contains("user/index.js"));
        assert_eq!(launcher.matches(r#"process.chdir("./user");"#).count(), 1);
        assert_eq!(
            launcher.matches(r#"listener = require("./user/index.js");"#).count(),
            1
        );
    }

    #[tokio::test]
    async fn test_bridge_is_verbatim() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp).await;

        let artifact = Assembler::default()
            .assemble(&staging, "index.js", &FakeBundler::new(), &FakeScripts::new())
            .await
            .unwrap();

        assert_eq!(text(artifact.files().get(BRIDGE_FILE).unwrap()).await, BRIDGE_SOURCE);
    }

    #[tokio::test]
    async fn test_build_script_runs_in_entrypoint_dir_before_bundling() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp).await;
        let scripts = FakeScripts::new();

        Assembler::new("now-build")
            .assemble(&staging, "index.js", &FakeBundler::new(), &scripts)
            .await
            .unwrap();

        assert_eq!(
            scripts.calls(),
            vec![(tmp.path().join("user"), "now-build".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failing_build_script_aborts() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp).await;
        let bundler = FakeBundler::new();

        let err = Assembler::default()
            .assemble(&staging, "index.js", &bundler, &FakeScripts::failing())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UserScript { ref script, .. } if script == "now-build"));
        assert!(bundler.calls().is_empty());
    }

    #[tokio::test]
    async fn test_bundler_failure_is_compile_error() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp).await;

        let err = Assembler::default()
            .assemble(&staging, "index.js", &FakeBundler::failing(), &FakeScripts::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Compile { .. }));
    }

    #[tokio::test]
    async fn test_empty_bundle_is_compile_error() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp).await;

        let err = Assembler::default()
            .assemble(&staging, "index.js", &FakeBundler::empty(), &FakeScripts::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Compile { .. }));
    }

    #[tokio::test]
    async fn test_template_without_placeholder_fails() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp).await;

        let err = Assembler::with_resources("exports.launcher = null;", "", "now-build")
            .assemble(&staging, "index.js", &FakeBundler::new(), &FakeScripts::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Template { occurrences: 0, .. }));
    }

    #[tokio::test]
    async fn test_unstaged_entrypoint() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp).await;

        let err = Assembler::default()
            .assemble(&staging, "other.js", &FakeBundler::new(), &FakeScripts::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Compile { .. }));
    }
}
