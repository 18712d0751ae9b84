use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde_json::{json, Map, Value};

use super::proxy::ComponentProxy;
use crate::constants::INIT_METHOD;
use crate::hashing::{hash_value, to_canonical_json};
use crate::types::TypeMap;

/// Invocación interceptada de un método de componente.
///
/// Se produce una sola vez por llamada y no cambia después. `arguments`
/// guarda los valores literales de la llamada (parámetros del Operator,
/// query del Source), que forman parte de su contenido hasheable.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub component: ComponentProxy,
    pub method: String,
    pub inputs: TypeMap,
    pub output_specs: TypeMap,
    pub arguments: BTreeMap<String, Value>,
}

impl MethodCall {
    pub fn new(component: ComponentProxy, method: &str, inputs: TypeMap, output_specs: TypeMap) -> Self {
        Self { component,
               method: method.to_string(),
               inputs,
               output_specs,
               arguments: BTreeMap::new() }
    }

    pub fn with_arguments(mut self, arguments: BTreeMap<String, Value>) -> Self {
        self.arguments = arguments;
        self
    }

    /// `true` para la llamada equivalente al constructor.
    pub fn is_init(&self) -> bool {
        self.method == INIT_METHOD
    }

    /// Contenido estructural completo de la llamada.
    pub fn to_value(&self) -> Value {
        let types = |m: &TypeMap| Value::Object(m.iter().map(|(k, t)| (k.clone(), t.to_value())).collect::<Map<_, _>>());
        json!({
            "component": self.component.info(),
            "method": self.method,
            "inputs": types(&self.inputs),
            "outputSpecs": types(&self.output_specs),
            "arguments": self.arguments,
        })
    }

    /// Digest de `to_value` en JSON canónico: no depende del orden de los
    /// mapas de tipos.
    pub fn digest(&self) -> String {
        hash_value(&self.to_value())
    }
}

impl PartialEq for MethodCall {
    fn eq(&self, other: &Self) -> bool {
        self.component == other.component
        && self.method == other.method
        && self.inputs == other.inputs
        && self.output_specs == other.output_specs
        && self.arguments == other.arguments
    }
}

impl Eq for MethodCall {}

impl Hash for MethodCall {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.component.hash(state);
        self.method.hash(state);
        for map in [&self.inputs, &self.output_specs] {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            entries.hash(state);
        }
        for (k, v) in &self.arguments {
            k.hash(state);
            to_canonical_json(v).hash(state);
        }
    }
}
