//! Compiler installation, lookup, and the compile stage with its
//! newer-version fallback.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tester_core::{CompilerVersion, Package};
use tracing::{debug, info};

use crate::error::{OrchestratorError, Result};
use crate::process::{run_logged, CommandRunner, CommandSpec};
use crate::stage::{StageError, StageResult};
use crate::task_log::TaskLog;

pub trait CompilerLocator: Send + Sync {
    /// Path to the compiler entry script for `version`.
    fn compiler_path(&self, version: CompilerVersion) -> PathBuf;
}

/// Installs each supported compiler version into its own directory under
/// `install_root` and locates the installed entry scripts.
pub struct CompilerInstaller {
    install_root: PathBuf,
    npm: String,
    runner: Arc<dyn CommandRunner>,
}

impl CompilerInstaller {
    pub fn new(install_root: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            install_root: install_root.into(),
            npm: "npm".to_string(),
            runner,
        }
    }

    pub fn with_npm(mut self, npm: impl Into<String>) -> Self {
        self.npm = npm.into();
        self
    }

    pub fn install_dir(&self, version: CompilerVersion) -> PathBuf {
        self.install_root.join(version.as_str())
    }

    fn is_installed(&self, version: CompilerVersion) -> bool {
        self.install_dir(version)
            .join("node_modules")
            .join("typescript")
            .exists()
    }

    pub async fn install_all(&self) -> Result<()> {
        for version in CompilerVersion::ALL {
            self.install(version).await?;
        }
        Ok(())
    }

    pub async fn install(&self, version: CompilerVersion) -> Result<()> {
        if self.is_installed(version) {
            debug!(version = %version, "TypeScript already installed");
            return Ok(());
        }

        let dir = self.install_dir(version);
        tokio::fs::create_dir_all(&dir).await?;

        info!(version = %version, dir = %dir.display(), "Installing TypeScript");
        let command = CommandSpec::new(&self.npm)
            .args(["install", "--no-save"])
            .arg(format!("typescript@{}", version));
        let output = self.runner.run(&command, &dir).await;

        match output.failure_message() {
            Some(message) => Err(OrchestratorError::CompilerInstallFailed {
                version: version.to_string(),
                message,
            }),
            None => Ok(()),
        }
    }
}

impl CompilerLocator for CompilerInstaller {
    fn compiler_path(&self, version: CompilerVersion) -> PathBuf {
        self.install_dir(version)
            .join("node_modules")
            .join("typescript")
            .join("lib")
            .join("tsc.js")
    }
}

/// The compile stage.
///
/// A package that fails at its declared version is retried at
/// [`CompilerVersion::LATEST`]. If that succeeds, the declared-version error is
/// reported together with a note to raise the declared version. If it fails
/// too, only the declared-version error is reported.
pub struct CompilerFallback {
    runner: Arc<dyn CommandRunner>,
    locator: Arc<dyn CompilerLocator>,
    node: String,
}

impl CompilerFallback {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        locator: Arc<dyn CompilerLocator>,
        node: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            locator,
            node: node.into(),
        }
    }

    async fn run_at(&self, version: CompilerVersion, cwd: &Path, log: &mut TaskLog) -> Option<String> {
        let command = CommandSpec::node_script(&self.node, &self.locator.compiler_path(version));
        run_logged(self.runner.as_ref(), &command, cwd, log).await
    }

    pub async fn compile(&self, pkg: &Package, cwd: &Path, log: &mut TaskLog) -> StageResult {
        let declared = pkg.typescript_version;
        let Some(error) = self.run_at(declared, cwd, log).await else {
            return Ok(());
        };

        if declared.is_latest() {
            return Err(StageError::CommandFailed(error));
        }

        debug!(
            package = %pkg.name,
            declared = %declared,
            "Compile failed, retrying with latest TypeScript"
        );
        if self.run_at(CompilerVersion::LATEST, cwd, log).await.is_none() {
            return Err(StageError::CommandFailed(version_bump_message(&error, declared)));
        }

        Err(StageError::CommandFailed(error))
    }
}

fn version_bump_message(error: &str, declared: CompilerVersion) -> String {
    let latest = CompilerVersion::LATEST;
    format!(
        "{error}\n\
         Package compiles in TypeScript {latest} but not in {declared}.\n\
         You can add a line '// TypeScript Version: {latest}' to the end of the header to specify a new compiler version."
    )
}
