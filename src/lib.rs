//! mezuri
//!
//! Librería de fachada del sistema de componentes versionados:
//! - `config`: configuración de la aplicación (.env).
//! - `errors`: errores del workflow y su código de salida.
//! - `workflow`: ciclo de vida de un componente (init, commit, publish).

pub mod config;
pub mod errors;
pub mod workflow;

pub use config::{AppConfig, CONFIG};
pub use errors::WorkflowError;
pub use workflow::ComponentWorkspace;
