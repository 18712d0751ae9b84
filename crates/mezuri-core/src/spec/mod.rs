//! Documento de especificación de un componente (`specification.json`).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::component::{ComponentInfo, ComponentType};
use crate::declaration::IopDeclaration;
use crate::errors::Result;
use crate::version::Version;

/// Localización de la definición del componente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionLocation {
    pub file: String,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInfo {
    pub name: String,
    pub url: String,
}

/// Sección presente solo tras la primera publicación.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishInfo {
    pub remote: RemoteInfo,
    pub registry: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecDocument {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: Version,
    #[serde(default)]
    pub iop_declaration: Value,
    #[serde(default)]
    pub dependencies: Vec<ComponentInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<DefinitionLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<PublishInfo>,
}

impl SpecDocument {
    pub fn new(name: &str, description: &str, version: Version) -> Self {
        Self { name: name.to_string(),
               description: description.to_string(),
               version,
               iop_declaration: Value::Null,
               dependencies: Vec::new(),
               definition: None,
               publish: None }
    }

    pub fn with_definition(mut self, file: &str, class: &str) -> Self {
        self.definition = Some(DefinitionLocation { file: file.to_string(),
                                                    class: class.to_string() });
        self
    }

    /// Declaración tipada según la clase del componente.
    pub fn iop(&self, kind: ComponentType) -> Result<IopDeclaration> {
        IopDeclaration::from_value(kind, &self.iop_declaration)
    }

    /// Guarda la declaración y rellena `dependencies` (ordenadas) a partir de
    /// las interfaces que referencia.
    pub fn set_iop(&mut self, iop: &IopDeclaration) {
        self.iop_declaration = iop.to_value();
        self.set_dependencies(iop.dependencies());
    }

    pub fn set_dependencies(&mut self, deps: BTreeSet<ComponentInfo>) {
        self.dependencies = deps.into_iter().collect();
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{ComponentDefinition, MethodDeclaration};
    use crate::types::Type;
    use serde_json::json;

    struct Classifier;

    impl ComponentDefinition for Classifier {
        fn declarations(&self) -> Vec<MethodDeclaration> {
            vec![MethodDeclaration::io("classify").input("b", Type::interface("http://r", "b", "1.0.0"))
                                                  .input("a", Type::interface("http://r", "a", "2.0.0"))
                                                  .output("label", Type::String)]
        }
    }

    #[test]
    fn document_uses_camel_case_keys() {
        let doc = SpecDocument::new("threshold", "demo", Version::new(0, 1, 0)).with_definition("def.json", "Threshold");
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["version"], json!("0.1.0"));
        assert!(value.get("iopDeclaration").is_some());
        assert!(value.get("publish").is_none());
        assert_eq!(value["definition"], json!({"file": "def.json", "class": "Threshold"}));
    }

    #[test]
    fn dependencies_are_sorted() {
        let mut doc = SpecDocument::new("classifier", "", Version::default());
        let iop = IopDeclaration::extract(ComponentType::Operator, &Classifier);
        doc.set_iop(&iop);
        let names: Vec<&str> = doc.dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        let back = SpecDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.iop(ComponentType::Operator).unwrap(), iop);
    }
}
