use std::cell::Cell;
use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::info::{ComponentInfo, ComponentType};
use crate::errors::{CoreError, Result};
use crate::spec::SpecDocument;

/// Lo que devuelve el resolver por una versión de componente: la
/// especificación y el hash de contenido, siempre juntos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedComponent {
    pub specs: SpecDocument,
    pub hash: String,
}

/// Resolver remoto de componentes (el registry visto desde el core).
///
/// Las llamadas son síncronas y bloqueantes; el core no reintenta.
pub trait ComponentResolver {
    /// Falla con `NotFound` si el componente o la versión no existen.
    fn get_component_version(&self, info: &ComponentInfo) -> Result<ResolvedComponent>;
}

/// Solicitud de registro de una versión publicada.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub component_type: ComponentType,
    pub name: String,
    pub git_remote_url: String,
    pub tag: String,
    pub version: String,
    pub hash: String,
}

/// Destino de las publicaciones (el registry visto desde el workflow).
pub trait ComponentPublisher {
    fn publish(&mut self, request: &PublishRequest) -> Result<()>;
}

/// Resolver en memoria, para tests y demos.
#[derive(Default)]
pub struct InMemoryResolver {
    components: HashMap<ComponentInfo, ResolvedComponent>,
    lookups: Cell<usize>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: ComponentInfo, specs: SpecDocument, hash: &str) {
        self.components.insert(info,
                               ResolvedComponent { specs,
                                                   hash: hash.to_string() });
    }

    pub fn with_component(mut self, info: ComponentInfo, specs: SpecDocument, hash: &str) -> Self {
        self.insert(info, specs, hash);
        self
    }

    /// Número de consultas atendidas (incluidas las fallidas).
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }
}

impl ComponentResolver for InMemoryResolver {
    fn get_component_version(&self, info: &ComponentInfo) -> Result<ResolvedComponent> {
        self.lookups.set(self.lookups.get() + 1);
        debug!("resolving {info}");
        self.components
            .get(info)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(info.to_string()))
    }
}
