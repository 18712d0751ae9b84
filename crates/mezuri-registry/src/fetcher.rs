//! Lectura de la especificación publicada en el remoto de un componente.

use log::debug;
use mezuri_core::revision::InMemoryRemotes;
use mezuri_core::spec::SpecDocument;

use crate::error::RegistryError;

/// Especificación en un tag y el id al que resuelve el tag.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedSpec {
    pub specs: SpecDocument,
    pub revision: String,
}

pub trait SpecFetcher {
    /// Lee `spec_filename` en `tag` del repositorio `remote_url`.
    ///
    /// `RemoteUnavailable` si el remoto no se puede leer; `RemoteMismatch`
    /// si el tag o el fichero no existen; `InvalidSpec` si el fichero no es
    /// una especificación.
    fn fetch(&self, remote_url: &str, tag: &str, spec_filename: &str) -> Result<FetchedSpec, RegistryError>;
}

/// Parsea la especificación leída de `remote_url` en `tag`.
pub fn parse_spec(bytes: &[u8], remote_url: &str, tag: &str) -> Result<SpecDocument, RegistryError> {
    SpecDocument::from_slice(bytes).map_err(|e| RegistryError::InvalidSpec(format!("{remote_url}@{tag}: {e}")))
}

/// Fetcher sobre los remotos en memoria del core.
#[derive(Debug, Clone, Default)]
pub struct InMemorySpecFetcher {
    remotes: InMemoryRemotes,
}

impl InMemorySpecFetcher {
    pub fn new(remotes: InMemoryRemotes) -> Self {
        Self { remotes }
    }
}

impl SpecFetcher for InMemorySpecFetcher {
    fn fetch(&self, remote_url: &str, tag: &str, spec_filename: &str) -> Result<FetchedSpec, RegistryError> {
        debug!("fetching {spec_filename} from {remote_url} at {tag}");
        let repo = self.remotes
                       .repository(remote_url)
                       .ok_or_else(|| RegistryError::RemoteUnavailable(remote_url.to_string()))?;
        let revision = repo.rev_parse(tag)
                           .ok_or_else(|| RegistryError::RemoteMismatch(format!("tag '{tag}' not found in {remote_url}")))?;
        let bytes = repo.show(spec_filename, tag)
                        .ok_or_else(|| RegistryError::RemoteMismatch(format!("{spec_filename} not present at {tag}")))?;
        Ok(FetchedSpec { specs: parse_spec(&bytes, remote_url, tag)?,
                         revision })
    }
}
