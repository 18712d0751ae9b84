//! Revision store: operaciones de control de versiones que consume el
//! workflow de componentes.
//!
//! `InMemoryRevisionStore` es la implementación de referencia (tests,
//! demos); la implementación sobre `git` vive en `mezuri-git`.

mod memory;

pub use memory::{InMemoryRemotes, InMemoryRevisionStore, RepositorySnapshot};

use crate::errors::Result;

pub trait RevisionStore {
    /// Inicializa el repositorio (idempotente).
    fn init(&mut self) -> Result<()>;
    /// Empieza a seguir `path`; los commits incluyen todos los ficheros
    /// seguidos.
    fn add(&mut self, path: &str) -> Result<()>;
    /// Crea un commit y devuelve su id.
    fn commit(&mut self, message: &str) -> Result<String>;
    /// Crea un tag anotado sobre HEAD y devuelve el id del tag.
    fn tag(&mut self, name: &str, message: &str) -> Result<String>;
    /// Contenido de `path` en `revision` (commit, tag o `HEAD`). `None` si
    /// la revisión o el fichero no existen.
    fn show(&self, path: &str, revision: &str) -> Result<Option<Vec<u8>>>;
    /// `false` si el remoto no acepta el push.
    fn push(&mut self, remote: &str) -> Result<bool>;
    fn list_tags(&self) -> Result<Vec<String>>;
    fn list_remotes(&self) -> Result<Vec<String>>;
    fn remote_url(&self, name: &str) -> Result<String>;
    fn add_remote(&mut self, name: &str, url: &str) -> Result<()>;
    /// Id del objeto al que apunta `reference`.
    fn rev_parse(&self, reference: &str) -> Result<String>;

    /// Lectura del árbol de trabajo. `None` si el fichero no existe.
    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>>;
    fn write_file(&mut self, path: &str, contents: &[u8]) -> Result<()>;
}
