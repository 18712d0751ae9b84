//! Mecanismo de declaración de componentes.
//!
//! Los autores describen los métodos de su componente con el builder
//! `MethodDeclaration` (o en un fichero JSON de definición) y el core extrae
//! de ahí la `IopDeclaration` que se persiste en la especificación.

mod builder;
mod definition_file;
mod iop;

pub use builder::{ComponentDefinition, MethodDeclaration, MethodKind, SourceReaderInfo, TypedFields};
pub use definition_file::{find_definition, load_definition, DefinedComponent, DefinedMethod, DefinitionFile};
pub use iop::{fields_from_value, fields_to_value, IopDeclaration, MethodSpec, SourceMethodSpec};
