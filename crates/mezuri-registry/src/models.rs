//! Documentos que guarda el registry.

use chrono::{DateTime, Utc};
use mezuri_core::spec::SpecDocument;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Componente registrado: nombre, remoto git y ids de sus versiones en
/// orden de publicación.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    pub id: Uuid,
    pub name: String,
    pub git_remote_url: String,
    pub versions: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl ComponentRecord {
    pub fn new(name: &str, git_remote_url: &str) -> Self {
        Self { id: Uuid::new_v4(),
               name: name.to_string(),
               git_remote_url: git_remote_url.to_string(),
               versions: Vec::new(),
               created_at: Utc::now() }
    }
}

/// Versión publicada: el hash anunciado y la especificación leída del
/// remoto en el tag de la versión.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub id: Uuid,
    pub version: String,
    pub hash: String,
    pub component_name: String,
    pub specs: SpecDocument,
    pub published_at: DateTime<Utc>,
}

impl VersionRecord {
    pub fn new(component_name: &str, version: &str, hash: &str, specs: SpecDocument) -> Self {
        Self { id: Uuid::new_v4(),
               version: version.to_string(),
               hash: hash.to_string(),
               component_name: component_name.to_string(),
               specs,
               published_at: Utc::now() }
    }
}
