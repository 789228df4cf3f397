use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unsupported TypeScript version: {0}")]
    UnsupportedVersion(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
