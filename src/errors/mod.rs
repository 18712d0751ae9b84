//! Errores del workflow de componentes.

pub mod workflow_error;

pub use workflow_error::WorkflowError;
