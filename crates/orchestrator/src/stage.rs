use std::fmt;

use thiserror::Error;

use crate::error::OrchestratorError;

/// One check in the validation pipeline, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Config,
    Manifest,
    Compile,
    Lint,
}

impl Stage {
    pub const ORDER: [Stage; 4] = [Stage::Config, Stage::Manifest, Stage::Compile, Stage::Lint];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Manifest => "manifest",
            Self::Compile => "compile",
            Self::Lint => "lint",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a stage rejected a package. Always converted into a failure outcome
/// at the pipeline boundary.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    CommandFailed(String),

    #[error(transparent)]
    Read(#[from] OrchestratorError),
}

impl StageError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

pub type StageResult = std::result::Result<(), StageError>;
