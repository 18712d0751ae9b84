use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::value_type::{InterfaceRef, Type, TypeMap};
use crate::errors::{CoreError, Result};

/// Forma serializada de un `Type`: `(tag, contenido)`.
///
/// En JSON es un array de dos elementos, p.ej. `["LIST", ["INT", null]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedType(pub String, pub Value);

/// Deserializador de un tag. Recibe el contenido y el registry para poder
/// resolver tipos anidados.
pub type DeserializeFn = fn(&Value, &TypeRegistry) -> Result<Type>;

/// Registro tag -> deserializador.
#[derive(Default)]
pub struct TypeRegistry {
    entries: HashMap<String, DeserializeFn>,
}

/// Registry global con los tipos incorporados. Se construye una sola vez al
/// primer uso; un tag duplicado aborta la carga.
pub static TYPE_REGISTRY: Lazy<TypeRegistry> =
    Lazy::new(|| TypeRegistry::with_builtins().expect("built-in type tags must be unique"));

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Type::INT, |_, _| Ok(Type::Int))?;
        registry.register(Type::BOOL, |_, _| Ok(Type::Bool))?;
        registry.register(Type::DOUBLE, |_, _| Ok(Type::Double))?;
        registry.register(Type::STRING, |_, _| Ok(Type::String))?;
        registry.register(Type::DATETIME, |_, _| Ok(Type::Datetime))?;
        registry.register(Type::LIST, deserialize_list)?;
        registry.register(Type::DICT, deserialize_dict)?;
        registry.register(Type::INTERFACE, deserialize_interface)?;
        Ok(registry)
    }

    /// Registra un deserializador. Registrar dos veces el mismo tag es un
    /// error de programación y se reporta como `DuplicateTypeTag`.
    pub fn register(&mut self, tag: &str, deserializer: DeserializeFn) -> Result<()> {
        if self.entries.contains_key(tag) {
            return Err(CoreError::DuplicateTypeTag(tag.to_string()));
        }
        self.entries.insert(tag.to_string(), deserializer);
        Ok(())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    pub fn deserialize(&self, serialized: &SerializedType) -> Result<Type> {
        let SerializedType(tag, contents) = serialized;
        let deserializer = self.entries
                               .get(tag)
                               .ok_or_else(|| CoreError::UnknownTypeTag(tag.clone()))?;
        deserializer(contents, self)
    }

    /// Deserializa la forma JSON `[tag, contenido]`.
    pub fn deserialize_value(&self, value: &Value) -> Result<Type> {
        match value.as_array().map(Vec::as_slice) {
            Some([Value::String(tag), contents]) => self.deserialize(&SerializedType(tag.clone(), contents.clone())),
            _ => Err(CoreError::MalformedDeclaration(format!("expected [tag, contents], got {value}"))),
        }
    }
}

fn deserialize_list(contents: &Value, registry: &TypeRegistry) -> Result<Type> {
    Ok(Type::list(registry.deserialize_value(contents)?))
}

fn deserialize_dict(contents: &Value, registry: &TypeRegistry) -> Result<Type> {
    let fields = contents.as_object()
                         .ok_or_else(|| CoreError::MalformedDeclaration(format!("DICT expects an object, got {contents}")))?;
    let mut map = TypeMap::new();
    for (name, field) in fields {
        map.insert(name.clone(), registry.deserialize_value(field)?);
    }
    Ok(Type::Dict(map))
}

fn deserialize_interface(contents: &Value, _registry: &TypeRegistry) -> Result<Type> {
    match contents.as_array().map(Vec::as_slice) {
        Some([Value::String(registry), Value::String(name), Value::String(version)]) => {
            Ok(Type::Interface(InterfaceRef::new(registry.as_str(), name.as_str(), version.as_str())))
        }
        _ => Err(CoreError::MalformedDeclaration(format!("INTERFACE expects [registry, name, version], got {contents}"))),
    }
}
