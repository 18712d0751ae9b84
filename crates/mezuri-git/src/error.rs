//! Fallos al invocar `git`.

use mezuri_core::errors::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("cannot run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("`git {command}` failed: {stderr}")]
    Failed { command: String, stderr: String },
}

impl From<GitError> for CoreError {
    fn from(err: GitError) -> Self {
        CoreError::Io(err.to_string())
    }
}
