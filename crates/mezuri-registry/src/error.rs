//! Errores del registry.
//! Se traducen a las variantes remotas de `CoreError` cuando el registry
//! se usa como resolver o publisher del core.

use mezuri_core::errors::CoreError;
use mezuri_core::ComponentType;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
    #[error("{kind} component '{name}' already exists")]
    ComponentExists { kind: ComponentType, name: String },
    #[error("{kind} component '{name}' already has version {version}")]
    VersionExists { kind: ComponentType, name: String, version: String },
    #[error("{kind} component '{name}' not found")]
    ComponentNotFound { kind: ComponentType, name: String },
    #[error("version {version} of {kind} component '{name}' not found")]
    VersionNotFound { kind: ComponentType, name: String, version: String },
    #[error("cannot reach remote {0}")]
    RemoteUnavailable(String),
    #[error("remote does not match the published version: {0}")]
    RemoteMismatch(String),
    #[error("invalid specification: {0}")]
    InvalidSpec(String),
}

impl RegistryError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ComponentExists { .. } | Self::VersionExists { .. })
    }
}

impl From<RegistryError> for CoreError {
    fn from(err: RegistryError) -> Self {
        let message = err.to_string();
        match err {
            RegistryError::ComponentExists { .. } | RegistryError::VersionExists { .. } => CoreError::Conflict(message),
            RegistryError::ComponentNotFound { .. } | RegistryError::VersionNotFound { .. } => CoreError::NotFound(message),
            RegistryError::RemoteUnavailable(_) => CoreError::RemoteUnavailable(message),
            RegistryError::RemoteMismatch(_) | RegistryError::InvalidSpec(_) => CoreError::RemoteMismatch(message),
        }
    }
}
