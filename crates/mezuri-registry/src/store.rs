//! Registry en memoria.
//!
//! Las colecciones van separadas por clase de componente, como los
//! endpoints `/{type}/...` del registry: un Source y un Operator pueden
//! compartir nombre. El grafo de dependents es global porque la clave
//! (`ComponentInfo`) ya incluye la clase.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, info, warn};
use mezuri_core::component::{ComponentInfo, ComponentPublisher, ComponentResolver, ComponentType, PublishRequest, ResolvedComponent};
use mezuri_core::errors::Result as CoreResult;
use mezuri_core::version::Version;
use uuid::Uuid;

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::fetcher::SpecFetcher;
use crate::models::{ComponentRecord, VersionRecord};

#[derive(Debug, Default)]
struct Collections {
    components: BTreeMap<String, ComponentRecord>,
    versions: HashMap<Uuid, VersionRecord>,
}

pub struct Registry<F: SpecFetcher> {
    config: RegistryConfig,
    fetcher: F,
    collections: HashMap<ComponentType, Collections>,
    dependents: BTreeMap<ComponentInfo, BTreeSet<ComponentInfo>>,
}

impl<F: SpecFetcher> Registry<F> {
    pub fn new(config: RegistryConfig, fetcher: F) -> Self {
        Self { config,
               fetcher,
               collections: HashMap::new(),
               dependents: BTreeMap::new() }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Identidad de una versión servida por este registry.
    pub fn component_info(&self, kind: ComponentType, name: &str, version: &str) -> ComponentInfo {
        ComponentInfo::new(kind, &self.config.url, name, version)
    }

    pub fn create_component(&mut self, kind: ComponentType, name: &str, git_remote_url: &str) -> Result<&ComponentRecord, RegistryError> {
        let collection = self.collections.entry(kind).or_default();
        if collection.components.contains_key(name) {
            return Err(RegistryError::ComponentExists { kind,
                                                        name: name.to_string() });
        }
        info!("registering {kind} component '{name}' ({git_remote_url})");
        let record = collection.components
                               .entry(name.to_string())
                               .or_insert_with(|| ComponentRecord::new(name, git_remote_url));
        Ok(&*record)
    }

    pub fn get_component(&self, kind: ComponentType, name: &str) -> Result<&ComponentRecord, RegistryError> {
        self.collections
            .get(&kind)
            .and_then(|c| c.components.get(name))
            .ok_or_else(|| RegistryError::ComponentNotFound { kind,
                                                              name: name.to_string() })
    }

    /// Componentes de una clase, por nombre.
    pub fn list_components(&self, kind: ComponentType) -> Vec<&ComponentRecord> {
        self.collections
            .get(&kind)
            .map(|c| c.components.values().collect())
            .unwrap_or_default()
    }

    fn find_version(&self, kind: ComponentType, name: &str, version: &str) -> Option<&VersionRecord> {
        let collection = self.collections.get(&kind)?;
        let component = collection.components.get(name)?;
        component.versions
                 .iter()
                 .filter_map(|id| collection.versions.get(id))
                 .find(|v| v.version == version)
    }

    pub fn get_version(&self, kind: ComponentType, name: &str, version: &str) -> Result<&VersionRecord, RegistryError> {
        self.get_component(kind, name)?;
        self.find_version(kind, name, version)
            .ok_or_else(|| RegistryError::VersionNotFound { kind,
                                                            name: name.to_string(),
                                                            version: version.to_string() })
    }

    /// Versiones publicadas, de menor a mayor.
    pub fn list_versions(&self, kind: ComponentType, name: &str) -> Result<Vec<&VersionRecord>, RegistryError> {
        let component = self.get_component(kind, name)?;
        let mut versions: Vec<&VersionRecord> = self.collections
                                                    .get(&kind)
                                                    .map(|c| component.versions.iter().filter_map(|id| c.versions.get(id)).collect())
                                                    .unwrap_or_default();
        versions.sort_by_key(|v| v.specs.version);
        Ok(versions)
    }

    /// Componentes publicados que declaran `dependency` como dependencia.
    pub fn dependents(&self, dependency: &ComponentInfo) -> Vec<ComponentInfo> {
        self.dependents
            .get(dependency)
            .map(|d| d.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Publica `version` de un componente ya registrado.
    ///
    /// Lee la especificación del remoto del componente en `tag`; el tag debe
    /// resolver a `hash` y la especificación debe declarar `version`. Solo
    /// entonces se guarda la versión y se actualizan los dependents.
    pub fn publish_version(&mut self,
                           kind: ComponentType,
                           name: &str,
                           version: &str,
                           tag: &str,
                           hash: &str)
                           -> Result<&VersionRecord, RegistryError> {
        let remote_url = self.get_component(kind, name)?.git_remote_url.clone();
        if self.find_version(kind, name, version).is_some() {
            return Err(RegistryError::VersionExists { kind,
                                                      name: name.to_string(),
                                                      version: version.to_string() });
        }
        let announced: Version = version.parse()
                                        .map_err(|_| RegistryError::InvalidSpec(format!("'{version}' is not a valid version")))?;

        let fetched = self.fetcher.fetch(&remote_url, tag, &self.config.spec_filename)?;
        if fetched.revision != hash {
            return Err(RegistryError::RemoteMismatch(format!("tag '{tag}' resolves to {} but {hash} was announced",
                                                             fetched.revision)));
        }
        if fetched.specs.version != announced {
            return Err(RegistryError::RemoteMismatch(format!("specification at '{tag}' declares version {}, not {version}",
                                                             fetched.specs.version)));
        }

        let dependent = self.component_info(kind, name, version);
        for dependency in &fetched.specs.dependencies {
            debug!("{dependent} depends on {dependency}");
            self.dependents.entry(dependency.clone()).or_default().insert(dependent.clone());
        }

        let record = VersionRecord::new(name, version, hash, fetched.specs);
        let id = record.id;
        let collection = self.collections.entry(kind).or_default();
        if let Some(component) = collection.components.get_mut(name) {
            component.versions.push(id);
        }
        info!("published {kind} component '{name}' version {version}");
        Ok(&*collection.versions.entry(id).or_insert(record))
    }
}

impl<F: SpecFetcher> ComponentResolver for Registry<F> {
    fn get_component_version(&self, info: &ComponentInfo) -> CoreResult<ResolvedComponent> {
        if info.registry_url != self.config.url {
            debug!("resolving {info} from {}", self.config.url);
        }
        let record = self.get_version(info.component_type, &info.name, &info.version)?;
        Ok(ResolvedComponent { specs: record.specs.clone(),
                               hash: record.hash.clone() })
    }
}

impl<F: SpecFetcher> ComponentPublisher for Registry<F> {
    /// Registra el componente si es nuevo y publica la versión pedida.
    fn publish(&mut self, request: &PublishRequest) -> CoreResult<()> {
        let known_remote = self.get_component(request.component_type, &request.name)
                               .ok()
                               .map(|c| c.git_remote_url.clone());
        match known_remote {
            None => {
                self.create_component(request.component_type, &request.name, &request.git_remote_url)?;
            }
            Some(url) if url != request.git_remote_url => {
                warn!("'{}' is registered with remote {url}, ignoring {}", request.name, request.git_remote_url);
            }
            Some(_) => {}
        }
        self.publish_version(request.component_type, &request.name, &request.version, &request.tag, &request.hash)?;
        Ok(())
    }
}
