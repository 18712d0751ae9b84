//! Sistema de tipos serializables de los componentes.
//!
//! Un `Type` describe la forma de los datos que entran y salen de los
//! métodos de un componente:
//! - escalares (`Int`, `Bool`, `Double`, `String`, `Datetime`),
//! - `List(elemento)`,
//! - `Dict(campos)` con orden de inserción,
//! - `Interface(ref)`, referencia a una interfaz publicada en un registry.
//!
//! La forma serializada es un par `(tag, contenido)` (ver `SerializedType`);
//! el `TypeRegistry` global asocia cada tag con su deserializador.

mod registry;
mod value_type;

pub use registry::{DeserializeFn, SerializedType, TypeRegistry, TYPE_REGISTRY};
pub use value_type::{InterfaceRef, Type, TypeMap};
