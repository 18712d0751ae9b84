use log::{debug, info};
use mezuri_core::component::{ComponentPublisher, ComponentType, PublishRequest};
use mezuri_core::constants::TAG_MESSAGE_PREFIX;
use mezuri_core::declaration::{find_definition, IopDeclaration};
use mezuri_core::errors::CoreError;
use mezuri_core::revision::RevisionStore;
use mezuri_core::spec::{DefinitionLocation, PublishInfo, RemoteInfo, SpecDocument};
use mezuri_core::version::{Version, VersionTag};

use crate::config::CONFIG;
use crate::errors::WorkflowError;

pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Un componente en desarrollo: su clase, su revision store y el nombre
/// del documento de especificación dentro del store.
pub struct ComponentWorkspace<S: RevisionStore> {
    kind: ComponentType,
    store: S,
    spec_filename: String,
}

impl<S: RevisionStore> ComponentWorkspace<S> {
    pub fn new(kind: ComponentType, store: S) -> Self {
        Self { kind,
               store,
               spec_filename: CONFIG.spec_filename.clone() }
    }

    pub fn with_spec_filename(mut self, filename: &str) -> Self {
        self.spec_filename = filename.to_string();
        self
    }

    pub fn kind(&self) -> ComponentType {
        self.kind
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Especificación del árbol de trabajo.
    pub fn load_spec(&self) -> Result<SpecDocument> {
        let bytes = self.store
                        .read_file(&self.spec_filename)?
                        .ok_or_else(|| WorkflowError::NotInitialized(self.spec_filename.clone()))?;
        Ok(SpecDocument::from_slice(&bytes)?)
    }

    fn write_spec(&mut self, spec: &SpecDocument) -> Result<()> {
        self.store.write_file(&self.spec_filename, spec.to_json()?.as_bytes())?;
        Ok(())
    }

    /// Crea la especificación inicial y empieza a seguirla.
    pub fn init(&mut self,
                name: &str,
                description: &str,
                version: Version,
                definition: Option<DefinitionLocation>)
                -> Result<SpecDocument> {
        if self.store.read_file(&self.spec_filename)?.is_some() {
            return Err(WorkflowError::AlreadyInitialized(self.spec_filename.clone()));
        }
        let mut spec = SpecDocument::new(name, description, version);
        spec.definition = definition;
        self.store.init()?;
        self.write_spec(&spec)?;
        self.store.add(&self.spec_filename)?;
        info!("initialized {} component '{name}' at version {version}", self.kind);
        Ok(spec)
    }

    /// Versión de la especificación en el último commit, si lo hay.
    fn committed_version(&self) -> Result<Option<Version>> {
        match self.store.show(&self.spec_filename, "HEAD")? {
            Some(bytes) => Ok(Some(SpecDocument::from_slice(&bytes)?.version)),
            None => Ok(None),
        }
    }

    fn latest_tag(&self, name: &str) -> Result<Option<VersionTag>> {
        Ok(VersionTag::latest(self.kind, name, self.store.list_tags()?))
    }

    /// Falla si `version` no supera la del último commit y la del último
    /// tag del componente.
    fn ensure_increasing(&self, name: &str, version: Version) -> Result<()> {
        let latest = [self.committed_version()?, self.latest_tag(name)?.map(|t| t.version)].into_iter()
                                                                                             .flatten()
                                                                                             .max();
        match latest {
            Some(latest) if version <= latest => Err(CoreError::VersionNotIncreasing { current: version.to_string(),
                                                                                        latest: latest.to_string() }.into()),
            _ => Ok(()),
        }
    }

    /// Declaración IOP extraída de la definición que apunta la
    /// especificación. Sin definición no hay versión.
    fn extract_iop(&self, spec: &SpecDocument) -> Result<IopDeclaration> {
        let location = spec.definition
                           .as_ref()
                           .ok_or_else(|| CoreError::NoDefinition { file: "(unset)".to_string(),
                                                                    class: "(unset)".to_string() })?;
        let no_definition = || CoreError::NoDefinition { file: location.file.clone(),
                                                         class: location.class.clone() };
        let text = self.store.read_file(&location.file)?.ok_or_else(no_definition)?;
        let defined = find_definition(&String::from_utf8_lossy(&text), &location.class).ok_or_else(no_definition)?;
        Ok(IopDeclaration::extract(self.kind, &defined))
    }

    /// Crea una versión: valida, actualiza la especificación, hace commit y
    /// crea el tag `mezuri/{type}/{name}/{version}/0`.
    pub fn commit(&mut self, message: &str, version: Option<Version>) -> Result<VersionTag> {
        let mut spec = self.load_spec()?;
        if let Some(version) = version {
            spec.version = version;
        }
        self.ensure_increasing(&spec.name, spec.version)?;
        let iop = self.extract_iop(&spec)?;
        spec.set_iop(&iop);
        debug!("{} declares {} dependencies", spec.name, spec.dependencies.len());

        self.write_spec(&spec)?;
        if let Some(location) = &spec.definition {
            self.store.add(&location.file)?;
        }
        self.store.add(&self.spec_filename)?;
        let commit = self.store.commit(message)?;
        let tag = VersionTag::new(self.kind, &spec.name, spec.version);
        self.store.tag(&tag.to_string(), &format!("{TAG_MESSAGE_PREFIX} {}", spec.version))?;
        info!("committed {tag} ({commit})");
        Ok(tag)
    }

    /// Tags de versión del componente, de menor a mayor.
    pub fn versions(&self) -> Result<Vec<VersionTag>> {
        let spec = self.load_spec()?;
        let mut tags: Vec<VersionTag> = self.store
                                            .list_tags()?
                                            .iter()
                                            .filter_map(|t| t.parse::<VersionTag>().ok())
                                            .filter(|t| t.component_type == self.kind && t.name == spec.name)
                                            .collect();
        tags.sort_by_key(|t| (t.version, t.update_num));
        Ok(tags)
    }

    /// Sección `publish` de la especificación, o la que se registrará en la
    /// primera publicación.
    fn publish_info(&self, spec: &SpecDocument, remote: &str, remote_url: Option<&str>, registry: Option<&str>) -> Result<PublishInfo> {
        if let Some(info) = &spec.publish {
            return Ok(info.clone());
        }
        let url = match remote_url {
            Some(url) => url.to_string(),
            None => self.store.remote_url(remote)?,
        };
        Ok(PublishInfo { remote: RemoteInfo { name: remote.to_string(),
                                              url },
                         registry: registry.unwrap_or(&CONFIG.default_registry).to_string() })
    }

    /// Empuja el repositorio al remoto y registra la última versión en
    /// `publisher`. Devuelve la solicitud enviada.
    ///
    /// En la primera publicación `remote_url` (o la URL ya configurada de
    /// `remote`) y `registry` quedan guardados en la especificación; después
    /// se usan los guardados.
    pub fn publish(&mut self,
                   remote: &str,
                   remote_url: Option<&str>,
                   registry: Option<&str>,
                   publisher: &mut dyn ComponentPublisher)
                   -> Result<PublishRequest> {
        let mut spec = self.load_spec()?;
        let tag = self.latest_tag(&spec.name)?
                      .ok_or_else(|| WorkflowError::NothingToPublish(spec.name.clone()))?;
        let info = self.publish_info(&spec, remote, remote_url, registry)?;
        if !self.store.list_remotes()?.contains(&info.remote.name) {
            self.store.add_remote(&info.remote.name, &info.remote.url)?;
        }
        if !self.store.push(&info.remote.name)? {
            return Err(CoreError::RemoteUnavailable(info.remote.url.clone()).into());
        }
        if spec.publish.is_none() {
            // entra en el próximo commit de versión
            spec.publish = Some(info.clone());
            self.write_spec(&spec)?;
        }

        let tag_name = tag.to_string();
        let request = PublishRequest { component_type: self.kind,
                                       name: spec.name.clone(),
                                       git_remote_url: info.remote.url.clone(),
                                       hash: self.store.rev_parse(&tag_name)?,
                                       tag: tag_name,
                                       version: tag.version.to_string() };
        publisher.publish(&request)?;
        info!("published {} to {}", request.tag, info.registry);
        Ok(request)
    }
}
