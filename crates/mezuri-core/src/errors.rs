//! Errores del core.
//!
//! Una sola enumeración agrupa las cuatro familias de fallos:
//! - declaración (definiciones ausentes o mal formadas, tags de tipo),
//! - contrato del pipeline (violaciones dentro del contexto de grabación),
//! - versionado (versiones y tags),
//! - remoto (resolver / revision store).
//!
//! Ningún error del core termina el proceso: el llamador puede capturarlo,
//! corregir y reintentar sobre el mismo `PipelineStep`.

use thiserror::Error;

/// Alias de resultado usado en todo el core.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    // -- declaración --
    #[error("no definition found for class '{class}' in '{file}'")]
    NoDefinition { file: String, class: String },
    #[error("malformed declaration: {0}")]
    MalformedDeclaration(String),
    #[error("unknown type tag '{0}'")]
    UnknownTypeTag(String),
    #[error("type tag '{0}' registered twice")]
    DuplicateTypeTag(String),

    // -- contrato del pipeline --
    #[error("component calls are only allowed inside a pipeline step context")]
    OutsideContext,
    #[error("a pipeline step is already being built; contexts cannot be nested")]
    NestedContext,
    #[error("pipeline step already set up")]
    StepAlreadySet,
    #[error("pipeline step has not been built yet")]
    StepNotBuilt,
    #[error("component {used} used when component {bound} is already bound to this step")]
    ComponentMismatch { bound: String, used: String },
    #[error("component {0} re-initialized in step")]
    ComponentReinitialized(String),
    #[error("a component method has already been called in this step (method '{0}')")]
    OutputAlreadySet(String),
    #[error("no component methods have been called for producing output")]
    NoOutput,
    #[error("component {component} does not declare method '{method}'")]
    UnknownMethod { component: String, method: String },
    #[error("arguments of {component}.{method} do not match its declaration: {reason}")]
    ArgumentMismatch { component: String, method: String, reason: String },
    #[error("component {component} is a {found}, expected a {expected}")]
    WrongComponentKind { component: String, expected: String, found: String },
    #[error("component {0} must be initialized before calling its methods")]
    NotInitialized(String),

    // -- versionado --
    #[error("'{0}' is not a valid version")]
    InvalidVersion(String),
    #[error("'{0}' is not a valid version tag")]
    InvalidVersionTag(String),
    #[error("version {current} not greater than {latest}")]
    VersionNotIncreasing { current: String, latest: String },
    #[error("version tags {left} and {right} belong to different components")]
    IncomparableTags { left: String, right: String },

    // -- remoto --
    #[error("not found: {0}")]
    NotFound(String),
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("remote mismatch: {0}")]
    RemoteMismatch(String),
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    /// `true` para las violaciones de contrato del pipeline (§ errores tipo b).
    pub fn is_contract_violation(&self) -> bool {
        matches!(self,
                 CoreError::OutsideContext
                 | CoreError::NestedContext
                 | CoreError::StepAlreadySet
                 | CoreError::StepNotBuilt
                 | CoreError::ComponentMismatch { .. }
                 | CoreError::ComponentReinitialized(_)
                 | CoreError::OutputAlreadySet(_)
                 | CoreError::NoOutput
                 | CoreError::UnknownMethod { .. }
                 | CoreError::ArgumentMismatch { .. }
                 | CoreError::WrongComponentKind { .. }
                 | CoreError::NotInitialized(_))
    }

    /// `true` para fallos del resolver o del revision store remoto.
    pub fn is_remote(&self) -> bool {
        matches!(self,
                 CoreError::NotFound(_)
                 | CoreError::RemoteUnavailable(_)
                 | CoreError::RemoteMismatch(_)
                 | CoreError::Conflict(_))
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_violations_are_distinguishable() {
        assert!(CoreError::NoOutput.is_contract_violation());
        assert!(CoreError::OutsideContext.is_contract_violation());
        assert!(!CoreError::NotFound("x".into()).is_contract_violation());
        assert!(CoreError::NotFound("x".into()).is_remote());
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::other("disk full");
        let err: CoreError = io_err.into();
        assert_eq!(err.to_string(), "io error: disk full");
    }

    #[test]
    fn version_error_names_both_versions() {
        let err = CoreError::VersionNotIncreasing { current: "1.0.0".into(),
                                                    latest: "1.2.0".into() };
        assert_eq!(err.to_string(), "version 1.0.0 not greater than 1.2.0");
    }
}
