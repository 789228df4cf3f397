use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{OrchestratorError, Result};
use crate::process::{CommandRunner, CommandSpec};

/// Lists files changed in a checkout relative to a base ref.
pub struct GitChangeDetector {
    runner: Arc<dyn CommandRunner>,
    base_ref: String,
}

impl GitChangeDetector {
    pub fn new(runner: Arc<dyn CommandRunner>, base_ref: impl Into<String>) -> Self {
        Self {
            runner,
            base_ref: base_ref.into(),
        }
    }

    pub async fn changed_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let command = CommandSpec::new("git").args(["diff", "--name-only", self.base_ref.as_str()]);
        let output = self.runner.run(&command, root).await;
        if let Some(message) = output.failure_message() {
            return Err(OrchestratorError::ChangeDetection(message));
        }

        let files = parse_name_only(&output.stdout);
        debug!(base_ref = %self.base_ref, files = files.len(), "Detected changed files");
        Ok(files)
    }
}

fn parse_name_only(stdout: &str) -> Vec<PathBuf> {
    let unique: BTreeSet<&str> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    unique.into_iter().map(PathBuf::from).collect()
}
