use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::DateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::registry::{SerializedType, TYPE_REGISTRY};
use crate::component::{ComponentInfo, ComponentType};
use crate::errors::Result;

/// Mapa ordenado nombre -> tipo. Es la forma de las entradas y salidas de
/// un método y del `output` de un step.
pub type TypeMap = IndexMap<String, Type>;

/// Referencia a una interfaz publicada.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InterfaceRef {
    pub registry: String,
    pub name: String,
    pub version: String,
}

impl InterfaceRef {
    pub fn new(registry: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self { registry: registry.into(),
               name: name.into(),
               version: version.into() }
    }

    /// Identidad de la interfaz como dependencia de otro componente.
    pub fn component_info(&self) -> ComponentInfo {
        ComponentInfo::new(ComponentType::Interface, &self.registry, &self.name, &self.version)
    }
}

/// Tipo de dato declarable.
///
/// La igualdad es estructural: los escalares comparan por tag, `List` por su
/// elemento y `Dict` por su mapa de campos clave a clave (el orden de los
/// campos no interviene en la igualdad, sí en la serialización).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Bool,
    Double,
    String,
    Datetime,
    List(Box<Type>),
    Dict(TypeMap),
    Interface(InterfaceRef),
}

impl Type {
    pub const INT: &'static str = "INT";
    pub const BOOL: &'static str = "BOOL";
    pub const DOUBLE: &'static str = "DOUBLE";
    pub const STRING: &'static str = "STRING";
    pub const DATETIME: &'static str = "DATETIME";
    pub const LIST: &'static str = "LIST";
    pub const DICT: &'static str = "DICT";
    pub const INTERFACE: &'static str = "INTERFACE";

    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    /// Construye un `Dict` conservando el orden de `fields`.
    pub fn dict<I, K>(fields: I) -> Self
        where I: IntoIterator<Item = (K, Type)>,
              K: Into<String>
    {
        Type::Dict(fields.into_iter().map(|(k, t)| (k.into(), t)).collect())
    }

    pub fn interface(registry: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Type::Interface(InterfaceRef::new(registry, name, version))
    }

    /// Tag estable del tipo en la forma serializada.
    pub fn tag(&self) -> &'static str {
        match self {
            Type::Int => Self::INT,
            Type::Bool => Self::BOOL,
            Type::Double => Self::DOUBLE,
            Type::String => Self::STRING,
            Type::Datetime => Self::DATETIME,
            Type::List(_) => Self::LIST,
            Type::Dict(_) => Self::DICT,
            Type::Interface(_) => Self::INTERFACE,
        }
    }

    /// Codificación estructural recursiva `(tag, contenido)`.
    pub fn to_serialized(&self) -> SerializedType {
        let contents = match self {
            Type::Int | Type::Bool | Type::Double | Type::String | Type::Datetime => Value::Null,
            Type::List(element) => element.to_value(),
            Type::Dict(fields) => {
                Value::Object(fields.iter().map(|(k, t)| (k.clone(), t.to_value())).collect())
            }
            Type::Interface(r) => Value::Array(vec![Value::String(r.registry.clone()),
                                                    Value::String(r.name.clone()),
                                                    Value::String(r.version.clone())]),
        };
        SerializedType(self.tag().to_string(), contents)
    }

    /// Inversa de `to_serialized`, resuelta a través del `TYPE_REGISTRY`.
    pub fn from_serialized(serialized: &SerializedType) -> Result<Type> {
        TYPE_REGISTRY.deserialize(serialized)
    }

    /// Forma serializada como JSON: `["INT", null]`, `["LIST", [...]]`, ...
    pub fn to_value(&self) -> Value {
        let SerializedType(tag, contents) = self.to_serialized();
        Value::Array(vec![Value::String(tag), contents])
    }

    pub fn from_value(value: &Value) -> Result<Type> {
        TYPE_REGISTRY.deserialize_value(value)
    }

    /// Interfaces alcanzables desde este tipo.
    pub fn dependencies(&self) -> BTreeSet<InterfaceRef> {
        let mut deps = BTreeSet::new();
        self.collect_dependencies(&mut deps);
        deps
    }

    fn collect_dependencies(&self, deps: &mut BTreeSet<InterfaceRef>) {
        match self {
            Type::List(element) => element.collect_dependencies(deps),
            Type::Dict(fields) => fields.values().for_each(|t| t.collect_dependencies(deps)),
            Type::Interface(r) => {
                deps.insert(r.clone());
            }
            _ => {}
        }
    }

    /// Comprueba si un valor literal (parámetro, query) encaja con el tipo.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Type::Int => value.is_i64() || value.is_u64(),
            Type::Bool => value.is_boolean(),
            Type::Double => value.is_number(),
            Type::String => value.is_string(),
            Type::Datetime => value.as_str().is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok()),
            Type::List(element) => value.as_array().is_some_and(|items| items.iter().all(|v| element.accepts(v))),
            Type::Dict(fields) => match value.as_object() {
                Some(obj) => {
                    obj.len() == fields.len()
                    && fields.iter().all(|(k, t)| obj.get(k).is_some_and(|v| t.accepts(v)))
                }
                None => false,
            },
            // Las interfaces son marcadores estructurales, no valores.
            Type::Interface(_) => false,
        }
    }
}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag().hash(state);
        match self {
            Type::List(element) => element.hash(state),
            Type::Dict(fields) => {
                // coherente con la igualdad: independiente del orden
                let mut entries: Vec<(&String, &Type)> = fields.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                entries.hash(state);
            }
            Type::Interface(r) => r.hash(state),
            _ => {}
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::List(element) => write!(f, "[{element}]"),
            Type::Dict(fields) => {
                let items: Vec<String> = fields.iter().map(|(k, t)| format!("{k}: {t}")).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            Type::Interface(r) => write!(f, "<{}/{}@{}>", r.registry, r.name, r.version),
            other => f.write_str(other.tag()),
        }
    }
}

impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_serialized().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Type {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let serialized = SerializedType::deserialize(deserializer)?;
        Type::from_serialized(&serialized).map_err(serde::de::Error::custom)
    }
}
