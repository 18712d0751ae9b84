use mezuri_core::errors::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("component already initialized: {0} exists")]
    AlreadyInitialized(String),
    #[error("component not initialized: {0} not found")]
    NotInitialized(String),
    #[error("no version of '{0}' has been committed yet")]
    NothingToPublish(String),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl WorkflowError {
    /// Código de salida del proceso para este error: 1 fallo de usuario,
    /// 4 fallo remoto, 5 resto.
    pub fn exit_code(&self) -> i32 {
        match self {
            WorkflowError::AlreadyInitialized(_) | WorkflowError::NotInitialized(_) | WorkflowError::NothingToPublish(_) => 1,
            WorkflowError::Core(e) if e.is_remote() => 4,
            WorkflowError::Core(CoreError::VersionNotIncreasing { .. }
                                | CoreError::InvalidVersion(_)
                                | CoreError::NoDefinition { .. }) => 1,
            WorkflowError::Core(_) => 5,
        }
    }
}
