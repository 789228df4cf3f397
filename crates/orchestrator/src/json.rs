use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;

use crate::error::{OrchestratorError, Result};

#[async_trait]
pub trait JsonReader: Send + Sync {
    async fn read_json(&self, path: &Path) -> Result<Value>;
}

/// Reads JSON files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsJsonReader;

#[async_trait]
impl JsonReader for FsJsonReader {
    async fn read_json(&self, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| OrchestratorError::ReadJson {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        serde_json::from_str(&content).map_err(|e| OrchestratorError::ReadJson {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
