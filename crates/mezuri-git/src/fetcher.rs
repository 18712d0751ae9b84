//! Fetcher del registry que clona el remoto del componente.

use log::debug;
use mezuri_core::revision::RevisionStore;
use mezuri_registry::{parse_spec, FetchedSpec, RegistryError, SpecFetcher};

use crate::store::GitRevisionStore;

/// Clona `remote_url` en un directorio temporal (borrado al terminar) y
/// lee la especificación en el tag.
#[derive(Debug, Clone, Default)]
pub struct GitSpecFetcher;

impl GitSpecFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl SpecFetcher for GitSpecFetcher {
    fn fetch(&self, remote_url: &str, tag: &str, spec_filename: &str) -> Result<FetchedSpec, RegistryError> {
        let workdir = tempfile::tempdir().map_err(|e| RegistryError::RemoteUnavailable(format!("{remote_url}: {e}")))?;
        let checkout = workdir.path().join("component");
        let target = checkout.to_string_lossy().to_string();
        let cloner = GitRevisionStore::new(workdir.path());
        debug!("cloning {remote_url} into {target}");
        let cloned = cloner.clone_repository(remote_url, &target)
                           .map_err(|e| RegistryError::RemoteUnavailable(format!("{remote_url}: {e}")))?;
        if !cloned {
            return Err(RegistryError::RemoteUnavailable(remote_url.to_string()));
        }

        let repo = GitRevisionStore::new(&checkout);
        let revision = repo.rev_parse(tag)
                           .map_err(|_| RegistryError::RemoteMismatch(format!("tag '{tag}' not found in {remote_url}")))?;
        let bytes = repo.show(spec_filename, tag)
                        .map_err(|e| RegistryError::RemoteUnavailable(e.to_string()))?
                        .ok_or_else(|| RegistryError::RemoteMismatch(format!("{spec_filename} not present at {tag}")))?;
        Ok(FetchedSpec { specs: parse_spec(&bytes, remote_url, tag)?,
                         revision })
    }
}
