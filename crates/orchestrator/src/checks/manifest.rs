use std::path::Path;

use serde_json::Value;

use crate::stage::{StageError, StageResult};

pub const PACKAGE_JSON_FILE: &str = "package.json";

/// Top-level manifest fields that carry meaning for a typings package.
pub fn default_allowed_fields() -> Vec<String> {
    ["dependencies", "peerDependencies", "description"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Rejects the first top-level key (in file order) outside `allowed`.
pub fn check_manifest(manifest: &Value, path: &Path, allowed: &[String]) -> StageResult {
    let fields = manifest.as_object().ok_or_else(|| {
        StageError::invalid(format!("Expected a JSON object in {}", path.display()))
    })?;

    match fields.keys().find(|key| !allowed.contains(key)) {
        Some(field) => Err(StageError::invalid(format!(
            "Ignored field in {}: {}",
            path.display(),
            field
        ))),
        None => Ok(()),
    }
}
