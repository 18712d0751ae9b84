use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Clase de componente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Source,
    Operator,
    Interface,
}

impl ComponentType {
    pub const ALL: [ComponentType; 3] = [ComponentType::Source, ComponentType::Operator, ComponentType::Interface];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Source => "source",
            ComponentType::Operator => "operator",
            ComponentType::Interface => "interface",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" => Ok(ComponentType::Source),
            "operator" => Ok(ComponentType::Operator),
            "interface" => Ok(ComponentType::Interface),
            other => Err(CoreError::MalformedDeclaration(format!("unknown component type '{other}'"))),
        }
    }
}

/// Identidad inmutable de un componente en un registry.
///
/// Es la clave de igualdad de los proxies, el elemento de los conjuntos de
/// dependencias y la clave de consulta del resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    pub component_type: ComponentType,
    pub registry_url: String,
    #[serde(rename = "componentName")]
    pub name: String,
    #[serde(rename = "componentVersion")]
    pub version: String,
}

impl ComponentInfo {
    pub fn new(component_type: ComponentType, registry_url: &str, name: &str, version: &str) -> Self {
        Self { component_type,
               registry_url: registry_url.to_string(),
               name: name.to_string(),
               version: version.to_string() }
    }
}

impl fmt::Display for ComponentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}@{}", self.component_type, self.registry_url, self.name, self.version)
    }
}
