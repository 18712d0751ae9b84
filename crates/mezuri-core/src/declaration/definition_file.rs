//! Definiciones de componentes escritas como JSON.
//!
//! Un fichero de definición agrupa clases por nombre:
//!
//! ```json
//! { "Threshold": { "methods": [
//!     { "name": "configure", "kind": "parameters",
//!       "parameters": [["threshold", ["DOUBLE", null]]] },
//!     { "name": "run", "kind": "io",
//!       "input": [["input", ["STRING", null]]],
//!       "output": [["result", ["BOOL", null]]] } ] } }
//! ```
//!
//! Los métodos de Source pueden llevar `"reader": {"uri": .., "query": ..}`.

use std::path::Path;

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::builder::{ComponentDefinition, MethodDeclaration, MethodKind, SourceReaderInfo, TypedFields};
use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinedMethod {
    pub name: String,
    pub kind: MethodKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input: TypedFields,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output: TypedFields,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: TypedFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reader: Option<SourceReaderInfo>,
}

impl DefinedMethod {
    pub fn with_reader(mut self, uri: &str, query: &str) -> Self {
        self.reader = Some(SourceReaderInfo { uri: uri.to_string(),
                                              query: query.to_string() });
        self
    }
}

impl From<MethodDeclaration> for DefinedMethod {
    fn from(decl: MethodDeclaration) -> Self {
        Self { name: decl.name,
               kind: decl.kind,
               input: decl.inputs,
               output: decl.outputs,
               parameters: decl.parameters,
               reader: None }
    }
}

/// Clase cargada de un fichero de definición.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinedComponent {
    #[serde(default)]
    pub methods: Vec<DefinedMethod>,
}

impl DefinedComponent {
    pub fn new(methods: Vec<DefinedMethod>) -> Self {
        Self { methods }
    }
}

impl ComponentDefinition for DefinedComponent {
    fn declarations(&self) -> Vec<MethodDeclaration> {
        self.methods
            .iter()
            .map(|m| MethodDeclaration { name: m.name.clone(),
                                         kind: m.kind,
                                         inputs: m.input.clone(),
                                         outputs: m.output.clone(),
                                         parameters: m.parameters.clone() })
            .collect()
    }

    fn open_reader(&self, method: &str) -> Option<SourceReaderInfo> {
        self.methods.iter().find(|m| m.name == method).and_then(|m| m.reader.clone())
    }
}

/// Contenido completo de un fichero de definición (clase -> definición).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionFile {
    pub classes: IndexMap<String, DefinedComponent>,
}

impl DefinitionFile {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_class(mut self, class: &str, component: DefinedComponent) -> Self {
        self.classes.insert(class.to_string(), component);
        self
    }
}

/// Carga la clase `class` de `file`.
///
/// Devuelve `None` ("no definition found") si el fichero no se puede leer,
/// no es una definición válida o no contiene la clase. El llamador decide si
/// eso es fatal (lo es al hacer commit de una versión).
pub fn load_definition(file: &Path, class: &str) -> Option<DefinedComponent> {
    match std::fs::read_to_string(file) {
        Ok(text) => find_definition(&text, class),
        Err(e) => {
            warn!("cannot read definition file {}: {e}", file.display());
            None
        }
    }
}

/// Igual que `load_definition` sobre el contenido ya leído.
pub fn find_definition(text: &str, class: &str) -> Option<DefinedComponent> {
    let mut parsed = match DefinitionFile::parse(text) {
        Ok(p) => p,
        Err(e) => {
            warn!("cannot evaluate definition: {e}");
            return None;
        }
    };
    let found = parsed.classes.swap_remove(class);
    if found.is_none() {
        debug!("class '{class}' not present in definition");
    }
    found
}
