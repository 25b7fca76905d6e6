//! Bundler boundary and the ncc implementation

use crate::stage::NCC_PACKAGE;
use crate::{Error, Result};
use async_trait::async_trait;
use fnpack_build_utils::run_command;
use std::path::{Path, PathBuf};

/// Compiles an entrypoint and everything it requires into a single file
#[async_trait]
pub trait Bundler: Send + Sync {
    /// Bundle the file at the absolute path `entrypoint`
    async fn bundle(&self, entrypoint: &Path) -> Result<Vec<u8>>;
}

/// Runs `@zeit/ncc` through `node`, loading it from an explicit module path
const NCC_DRIVER: &str = r"
const [modulePath, input] = process.argv.slice(1);
Promise.resolve(require(modulePath)(input))
  .then((result) => {
    process.stdout.write(typeof result === 'string' ? result : result.code);
  })
  .catch((error) => {
    console.error(error && error.stack ? error.stack : String(error));
    process.exit(1);
  });
";

/// [`Bundler`] backed by an installed copy of `@zeit/ncc`
#[derive(Debug, Clone)]
pub struct NccBundler {
    node: String,
    module_dir: PathBuf,
}

impl NccBundler {
    /// Resolve ncc inside `bundler_root` (the `ncc` staging directory).
    ///
    /// Fails if the package is not installed there.
    pub fn resolve(bundler_root: &Path, node: impl Into<String>) -> Result<Self> {
        let module_dir = bundler_root.join("node_modules").join(NCC_PACKAGE);
        if !module_dir.is_dir() {
            return Err(Error::compile(format!(
                "{NCC_PACKAGE} is not installed at {}",
                module_dir.display()
            )));
        }
        Ok(Self {
            node: node.into(),
            module_dir,
        })
    }

    /// Directory of the resolved ncc package
    #[must_use]
    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }
}

#[async_trait]
impl Bundler for NccBundler {
    async fn bundle(&self, entrypoint: &Path) -> Result<Vec<u8>> {
        let cwd = entrypoint.parent().unwrap_or(entrypoint);
        let args = vec![
            "-e".to_string(),
            NCC_DRIVER.to_string(),
            self.module_dir.display().to_string(),
            entrypoint.display().to_string(),
        ];

        let output = run_command(&self.node, &args, cwd)
            .await
            .map_err(|e| Error::compile(e.to_string()))?;
        if !output.success {
            return Err(Error::compile(output.combined()));
        }
        Ok(output.raw_stdout)
    }
}
