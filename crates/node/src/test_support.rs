//! Test doubles for the external collaborators

use crate::bundler::Bundler;
use crate::stage::BuildRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use fnpack_build_utils::{FileBlob, FileSet, Installer, PackageJson, ScriptRunner};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The request from the `index.js` example: a handler and an empty manifest
pub fn example_request(work_path: &Path) -> BuildRequest {
    let mut files = FileSet::new();
    files.insert(
        "index.js",
        FileBlob::new("module.exports=(req,res)=>res.end('ok')"),
    );
    files.insert("package.json", FileBlob::new("{}"));
    BuildRequest::new(files, "index.js", work_path)
}

/// Installer that lays out `node_modules` for declared dependencies
pub struct FakeInstaller {
    calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
    fail_in: Option<&'static str>,
}

impl FakeInstaller {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_in: None,
        }
    }

    /// Fail when installing into a directory named `dir_name`
    pub fn failing_in(dir_name: &'static str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_in: Some(dir_name),
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Installer for FakeInstaller {
    async fn install(&self, directory: &Path, args: &[String]) -> fnpack_build_utils::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((directory.to_path_buf(), args.to_vec()));

        if let Some(name) = self.fail_in
            && directory.file_name() == Some(OsStr::new(name))
        {
            return Err(fnpack_build_utils::Error::InstallationFailed {
                directory: directory.to_path_buf(),
                exit_code: Some(1),
                output: "install failed".to_string(),
            });
        }

        let node_modules = directory.join("node_modules");
        std::fs::create_dir_all(&node_modules).unwrap();
        std::fs::write(node_modules.join(".yarn-integrity"), "{}").unwrap();
        if let Some(manifest) = PackageJson::read(directory).await? {
            for name in manifest.dependencies.keys() {
                let package = node_modules.join(name);
                std::fs::create_dir_all(&package).unwrap();
                std::fs::write(package.join("index.js"), "module.exports = {};").unwrap();
            }
        }
        std::fs::write(directory.join("yarn.lock"), "# yarn lockfile v1\n").unwrap();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Script runner that records invocations
pub struct FakeScripts {
    calls: Mutex<Vec<(PathBuf, String)>>,
    fail: bool,
}

impl FakeScripts {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptRunner for FakeScripts {
    async fn run_script(&self, directory: &Path, script: &str) -> fnpack_build_utils::Result<bool> {
        self.calls
            .lock()
            .unwrap()
            .push((directory.to_path_buf(), script.to_string()));
        if self.fail {
            return Err(fnpack_build_utils::Error::CommandFailed {
                command: format!("yarn run {script}"),
                exit_code: Some(1),
                stdout: String::new(),
                stderr: "script failed".to_string(),
            });
        }
        Ok(true)
    }
}

enum BundleBehavior {
    Wrap,
    Empty,
    Fail,
}

/// Bundler that prefixes the entrypoint source with a marker comment
pub struct FakeBundler {
    calls: Mutex<Vec<PathBuf>>,
    behavior: BundleBehavior,
}

impl FakeBundler {
    pub fn new() -> Self {
        Self::with_behavior(BundleBehavior::Wrap)
    }

    pub fn empty() -> Self {
        Self::with_behavior(BundleBehavior::Empty)
    }

    pub fn failing() -> Self {
        Self::with_behavior(BundleBehavior::Fail)
    }

    fn with_behavior(behavior: BundleBehavior) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            behavior,
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Bundler for FakeBundler {
    async fn bundle(&self, entrypoint: &Path) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(entrypoint.to_path_buf());
        match self.behavior {
            BundleBehavior::Wrap => {
                let source = std::fs::read(entrypoint).unwrap();
                let mut code = b"/* bundled */\n".to_vec();
                code.extend(source);
                Ok(code)
            }
            BundleBehavior::Empty => Ok(Vec::new()),
            BundleBehavior::Fail => Err(Error::compile("Module not found: 'missing'")),
        }
    }
}
