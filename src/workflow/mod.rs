//! Ciclo de vida de un componente sobre un revision store:
//! `init` -> `commit` (una versión por commit, con tag) -> `publish`.
//!
//! Toda validación ocurre antes de cualquier efecto en el store: un commit
//! rechazado no deja ni commit ni tag.

mod workspace;

pub use workspace::ComponentWorkspace;
