use serde::{Deserialize, Serialize};

use crate::types::Type;

/// Lista ordenada de pares `(nombre, tipo)`.
pub type TypedFields = Vec<(String, Type)>;

/// Marca de un método declarado: método IO (inputs/outputs) o método de
/// parámetros (equivalente al constructor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Io,
    Parameters,
}

/// Declaración de un método de componente.
///
/// Cada llamada a `input`, `output` o `parameter` añade un par al final de su
/// lista, de modo que el orden de la lista es el orden en que el autor
/// escribió las declaraciones (la primera declarada queda primera).
///
/// ```
/// use mezuri_core::declaration::MethodDeclaration;
/// use mezuri_core::types::Type;
///
/// let run = MethodDeclaration::io("run").input("text", Type::String)
///                                       .output("result", Type::Bool);
/// assert_eq!(run.inputs[0].0, "text");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDeclaration {
    pub name: String,
    pub kind: MethodKind,
    pub inputs: TypedFields,
    pub outputs: TypedFields,
    pub parameters: TypedFields,
}

impl MethodDeclaration {
    fn new(name: &str, kind: MethodKind) -> Self {
        Self { name: name.to_string(),
               kind,
               inputs: Vec::new(),
               outputs: Vec::new(),
               parameters: Vec::new() }
    }

    pub fn io(name: &str) -> Self {
        Self::new(name, MethodKind::Io)
    }

    pub fn parameters(name: &str) -> Self {
        Self::new(name, MethodKind::Parameters)
    }

    pub fn input(mut self, name: &str, type_: Type) -> Self {
        self.inputs.push((name.to_string(), type_));
        self
    }

    pub fn output(mut self, name: &str, type_: Type) -> Self {
        self.outputs.push((name.to_string(), type_));
        self
    }

    pub fn parameter(mut self, name: &str, type_: Type) -> Self {
        self.parameters.push((name.to_string(), type_));
        self
    }

    pub fn is_io(&self) -> bool {
        self.kind == MethodKind::Io
    }

    pub fn is_parameter_method(&self) -> bool {
        self.kind == MethodKind::Parameters
    }
}

/// Lector devuelto por un método de un Source: dónde leer y qué consulta
/// usar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReaderInfo {
    pub uri: String,
    pub query: String,
}

/// Definición de un componente escrita por su autor.
///
/// Es el punto de extracción de las declaraciones: el core no ejecuta el
/// componente, solo lee lo que declara. Los Sources además abren un lector
/// por método para conocer su `uri` y su `query`.
pub trait ComponentDefinition {
    /// Métodos declarados, en orden de definición.
    fn declarations(&self) -> Vec<MethodDeclaration>;

    /// Lector asociado a un método de Source. `None` si el método no abre
    /// ninguno.
    fn open_reader(&self, _method: &str) -> Option<SourceReaderInfo> {
        None
    }
}
