use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read {path}: {reason}")]
    ReadJson { path: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dependency install failed for {package}: {message}")]
    InstallFailed { package: String, message: String },

    #[error("Installing TypeScript {version} failed: {message}")]
    CompilerInstallFailed { version: String, message: String },

    #[error("Invalid package pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Package not found: {0}")]
    UnknownPackage(String),

    #[error("Could not determine changed packages: {0}")]
    ChangeDetection(String),

    #[error("There was a test failure.")]
    BatchFailed { failures: usize },
}

impl OrchestratorError {
    pub fn install_failed(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InstallFailed {
            package: package.into(),
            message: message.into(),
        }
    }

    /// True for the batch-level failure raised after the report was rendered.
    pub fn is_batch_failure(&self) -> bool {
        matches!(self, Self::BatchFailed { .. })
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
