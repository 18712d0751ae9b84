//! mezuri-registry
//!
//! Registry de componentes en memoria. Guarda, por clase de componente, los
//! componentes (nombre y remoto git), sus versiones publicadas (hash y
//! especificación) y el grafo inverso de dependencias.
//!
//! Módulos:
//! - `config`: configuración desde el entorno (.env).
//! - `error`: errores del registry y su traducción a `CoreError`.
//! - `models`: documentos almacenados.
//! - `fetcher`: lectura de la especificación publicada en el remoto.
//! - `store`: el registry; implementa `ComponentResolver` y
//!   `ComponentPublisher` del core.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod store;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use fetcher::{parse_spec, FetchedSpec, InMemorySpecFetcher, SpecFetcher};
pub use models::{ComponentRecord, VersionRecord};
pub use store::Registry;
