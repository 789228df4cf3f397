//! Optional `typings-tester.toml` settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::checks::default_allowed_fields;
use crate::error::{OrchestratorError, Result};
use crate::pipeline::PipelineConfig;

pub const CONFIG_FILE: &str = "typings-tester.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesterConfig {
    /// Top-level package.json fields a typings package may declare.
    pub allowed_manifest_fields: Vec<String>,
    pub lint_script: PathBuf,
    pub compiler_install_root: PathBuf,
    /// Ref that change detection diffs against.
    pub base_ref: String,
    pub data_dir: PathBuf,
    pub node: String,
    pub npm: String,
}

impl Default for TesterConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let pipeline = PipelineConfig::default();
        Self {
            allowed_manifest_fields: default_allowed_fields(),
            lint_script: pipeline.lint_script,
            compiler_install_root: home.join(".typings-tester").join("typescript-installs"),
            base_ref: "master".to_string(),
            data_dir: PathBuf::from("data"),
            node: pipeline.node,
            npm: "npm".to_string(),
        }
    }
}

impl TesterConfig {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config = toml::from_str(&content).map_err(|e| {
            OrchestratorError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Loads `typings-tester.toml` from `dir` if present.
    pub async fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(&path).await
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_node(self.node.clone())
            .with_lint_script(self.lint_script.clone())
            .with_allowed_manifest_fields(self.allowed_manifest_fields.clone())
    }
}
