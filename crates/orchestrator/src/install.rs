//! Dependency installation for packages that ship their own manifest.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tester_core::{Package, TesterOptions};
use tracing::debug;

use crate::error::{OrchestratorError, Result};
use crate::process::{CommandRunner, CommandSpec};

static BENIGN_WARNINGS: OnceLock<Regex> = OnceLock::new();

fn benign_warnings() -> &'static Regex {
    BENIGN_WARNINGS.get_or_init(|| {
        Regex::new(r"npm WARN \S+ No (description|repository field\.|license field\.)\n?")
            .expect("Invalid npm warning regex")
    })
}

/// Removes npm advisories that every generated typings manifest triggers.
pub fn strip_benign_warnings(stdout: &str) -> String {
    benign_warnings().replace_all(stdout, "").into_owned()
}

pub struct DependencyInstaller {
    options: TesterOptions,
    npm: String,
    runner: Arc<dyn CommandRunner>,
}

impl DependencyInstaller {
    pub fn new(options: TesterOptions, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            options,
            npm: "npm".to_string(),
            runner,
        }
    }

    pub fn with_npm(mut self, npm: impl Into<String>) -> Self {
        self.npm = npm.into();
        self
    }

    /// Runs `npm install` in the package directory when it has a manifest.
    ///
    /// Returns whatever npm printed besides the benign advisories. A failed
    /// install is an error: nothing downstream is meaningful without it.
    pub async fn install(&self, pkg: &Package) -> Result<Option<String>> {
        if !pkg.has_package_json {
            return Ok(None);
        }

        let cwd = pkg.directory_path(&self.options);
        debug!(package = %pkg.name, cwd = %cwd.display(), "Installing dependencies");

        let output = self
            .runner
            .run(&CommandSpec::new(&self.npm).arg("install"), &cwd)
            .await;
        if let Some(message) = output.failure_message() {
            return Err(OrchestratorError::install_failed(pkg.desc(), message));
        }

        let remaining = strip_benign_warnings(&output.stdout);
        if remaining.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(remaining))
        }
    }
}
