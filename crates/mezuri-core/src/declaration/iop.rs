use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::warn;
use serde_json::{json, Map, Value};

use super::builder::{ComponentDefinition, SourceReaderInfo, TypedFields};
use crate::component::{ComponentInfo, ComponentType};
use crate::errors::{CoreError, Result};
use crate::types::{Type, TypeMap};

/// Entradas y salidas de un método de Operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodSpec {
    pub input: TypedFields,
    pub output: TypedFields,
}

/// Salida y lector de un método de Source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMethodSpec {
    pub output: TypedFields,
    pub uri: String,
    pub query: String,
}

/// Declaración IOP (input / output / parameters) extraída de una
/// definición. La forma depende de la clase de componente:
/// - Operator: `{methods: {m: {input, output}}, parameters: {p: tipo}}`
/// - Interface: sus campos, expuestos igual como `input` y como `output`
/// - Source: `{m: {output, uri, query}}`
#[derive(Debug, Clone, PartialEq)]
pub enum IopDeclaration {
    Operator { methods: IndexMap<String, MethodSpec>, parameters: TypeMap },
    Interface { fields: TypedFields },
    Source { methods: IndexMap<String, SourceMethodSpec> },
}

impl IopDeclaration {
    /// Declaración vacía de una clase (definición sin marcas).
    pub fn empty(kind: ComponentType) -> Self {
        match kind {
            ComponentType::Operator => IopDeclaration::Operator { methods: IndexMap::new(),
                                                                  parameters: TypeMap::new() },
            ComponentType::Interface => IopDeclaration::Interface { fields: Vec::new() },
            ComponentType::Source => IopDeclaration::Source { methods: IndexMap::new() },
        }
    }

    /// Recorre los métodos declarados de `definition`. Una definición sin
    /// métodos marcados produce una declaración vacía, no un error.
    pub fn extract(kind: ComponentType, definition: &dyn ComponentDefinition) -> Self {
        let declarations = definition.declarations();
        match kind {
            ComponentType::Operator => {
                let mut methods = IndexMap::new();
                let mut parameters = TypeMap::new();
                for decl in declarations {
                    if decl.is_io() {
                        methods.insert(decl.name.clone(), MethodSpec { input: decl.inputs, output: decl.outputs });
                    } else {
                        parameters.extend(decl.parameters);
                    }
                }
                IopDeclaration::Operator { methods, parameters }
            }
            ComponentType::Interface => {
                // la interfaz se define con su primer método IO
                let fields = declarations.into_iter()
                                         .find(|d| d.is_io())
                                         .map(|d| d.outputs)
                                         .unwrap_or_default();
                IopDeclaration::Interface { fields }
            }
            ComponentType::Source => {
                let mut methods = IndexMap::new();
                for decl in declarations.into_iter().filter(|d| d.is_io()) {
                    let reader = match definition.open_reader(&decl.name) {
                        Some(reader) => reader,
                        None => {
                            warn!("source method '{}' does not open a reader", decl.name);
                            SourceReaderInfo::default()
                        }
                    };
                    methods.insert(decl.name.clone(),
                                   SourceMethodSpec { output: decl.outputs,
                                                      uri: reader.uri,
                                                      query: reader.query });
                }
                IopDeclaration::Source { methods }
            }
        }
    }

    pub fn kind(&self) -> ComponentType {
        match self {
            IopDeclaration::Operator { .. } => ComponentType::Operator,
            IopDeclaration::Interface { .. } => ComponentType::Interface,
            IopDeclaration::Source { .. } => ComponentType::Source,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            IopDeclaration::Operator { methods, parameters } => methods.is_empty() && parameters.is_empty(),
            IopDeclaration::Interface { fields } => fields.is_empty(),
            IopDeclaration::Source { methods } => methods.is_empty(),
        }
    }

    /// Todos los tipos declarados, en orden.
    fn types(&self) -> Vec<&Type> {
        match self {
            IopDeclaration::Operator { methods, parameters } => {
                methods.values()
                       .flat_map(|m| m.input.iter().chain(m.output.iter()).map(|(_, t)| t))
                       .chain(parameters.values())
                       .collect()
            }
            IopDeclaration::Interface { fields } => fields.iter().map(|(_, t)| t).collect(),
            IopDeclaration::Source { methods } => methods.values().flat_map(|m| m.output.iter().map(|(_, t)| t)).collect(),
        }
    }

    /// Interfaces referenciadas por cualquier tipo declarado.
    pub fn dependencies(&self) -> BTreeSet<ComponentInfo> {
        self.types()
            .into_iter()
            .flat_map(|t| t.dependencies())
            .map(|r| r.component_info())
            .collect()
    }

    /// Forma persistida en el campo `iopDeclaration` del documento.
    pub fn to_value(&self) -> Value {
        match self {
            IopDeclaration::Operator { methods, parameters } => {
                let methods: Map<String, Value> = methods.iter()
                                                         .map(|(name, m)| {
                                                             (name.clone(),
                                                              json!({"input": fields_to_value(&m.input),
                                                                     "output": fields_to_value(&m.output)}))
                                                         })
                                                         .collect();
                let parameters: Map<String, Value> = parameters.iter().map(|(k, t)| (k.clone(), t.to_value())).collect();
                json!({"methods": methods, "parameters": parameters})
            }
            IopDeclaration::Interface { fields } => {
                json!({"input": fields_to_value(fields), "output": fields_to_value(fields)})
            }
            IopDeclaration::Source { methods } => {
                let methods: Map<String, Value> = methods.iter()
                                                         .map(|(name, m)| {
                                                             (name.clone(),
                                                              json!({"output": fields_to_value(&m.output),
                                                                     "uri": m.uri,
                                                                     "query": m.query}))
                                                         })
                                                         .collect();
                Value::Object(methods)
            }
        }
    }

    pub fn from_value(kind: ComponentType, value: &Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::empty(kind));
        }
        let obj = as_object(value, "iopDeclaration")?;
        match kind {
            ComponentType::Operator => {
                let mut methods = IndexMap::new();
                if let Some(raw) = obj.get("methods") {
                    for (name, m) in as_object(raw, "methods")? {
                        let m = as_object(m, name)?;
                        methods.insert(name.clone(),
                                       MethodSpec { input: fields_from_value(m.get("input"))?,
                                                    output: fields_from_value(m.get("output"))? });
                    }
                }
                let mut parameters = TypeMap::new();
                if let Some(raw) = obj.get("parameters") {
                    for (name, t) in as_object(raw, "parameters")? {
                        parameters.insert(name.clone(), Type::from_value(t)?);
                    }
                }
                Ok(IopDeclaration::Operator { methods, parameters })
            }
            ComponentType::Interface => {
                Ok(IopDeclaration::Interface { fields: fields_from_value(obj.get("output").or_else(|| obj.get("input")))? })
            }
            ComponentType::Source => {
                let mut methods = IndexMap::new();
                for (name, m) in obj {
                    let m = as_object(m, name)?;
                    let text = |key: &str| m.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
                    methods.insert(name.clone(),
                                   SourceMethodSpec { output: fields_from_value(m.get("output"))?,
                                                      uri: text("uri"),
                                                      query: text("query") });
                }
                Ok(IopDeclaration::Source { methods })
            }
        }
    }
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value.as_object()
         .ok_or_else(|| CoreError::MalformedDeclaration(format!("'{what}' must be an object")))
}

/// `[(nombre, tipo)]` -> `[[nombre, [tag, contenido]], ...]`
pub fn fields_to_value(fields: &TypedFields) -> Value {
    Value::Array(fields.iter()
                       .map(|(name, t)| Value::Array(vec![Value::String(name.clone()), t.to_value()]))
                       .collect())
}

pub fn fields_from_value(value: Option<&Value>) -> Result<TypedFields> {
    let Some(value) = value else { return Ok(Vec::new()) };
    let items = value.as_array()
                     .ok_or_else(|| CoreError::MalformedDeclaration(format!("expected a list of fields, got {value}")))?;
    items.iter()
         .map(|item| match item.as_array().map(Vec::as_slice) {
             Some([Value::String(name), t]) => Ok((name.clone(), Type::from_value(t)?)),
             _ => Err(CoreError::MalformedDeclaration(format!("expected [name, type], got {item}"))),
         })
         .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::MethodDeclaration;

    struct Threshold;

    impl ComponentDefinition for Threshold {
        fn declarations(&self) -> Vec<MethodDeclaration> {
            vec![MethodDeclaration::parameters("configure").parameter("threshold", Type::Double),
                 MethodDeclaration::io("run").input("input", Type::String)
                                             .output("result", Type::Bool)]
        }
    }

    struct Tweets;

    impl ComponentDefinition for Tweets {
        fn declarations(&self) -> Vec<MethodDeclaration> {
            vec![MethodDeclaration::io("tweets").output("tweet", Type::interface("http://r", "tweet", "1.0.0"))]
        }

        fn open_reader(&self, method: &str) -> Option<SourceReaderInfo> {
            (method == "tweets").then(|| SourceReaderInfo { uri: "file:///tweets.csv".into(),
                                                            query: "*".into() })
        }
    }

    struct Unmarked;

    impl ComponentDefinition for Unmarked {
        fn declarations(&self) -> Vec<MethodDeclaration> {
            Vec::new()
        }
    }

    #[test]
    fn operator_extraction_splits_methods_and_parameters() {
        let iop = IopDeclaration::extract(ComponentType::Operator, &Threshold);
        match &iop {
            IopDeclaration::Operator { methods, parameters } => {
                assert_eq!(parameters.get("threshold"), Some(&Type::Double));
                assert_eq!(methods["run"].output, vec![("result".to_string(), Type::Bool)]);
            }
            other => panic!("unexpected {other:?}"),
        }
        let back = IopDeclaration::from_value(ComponentType::Operator, &iop.to_value()).unwrap();
        assert_eq!(back, iop);
    }

    #[test]
    fn source_extraction_reads_uri_and_query() {
        let iop = IopDeclaration::extract(ComponentType::Source, &Tweets);
        let value = iop.to_value();
        assert_eq!(value["tweets"]["uri"], "file:///tweets.csv");
        assert_eq!(value["tweets"]["query"], "*");
        let deps = iop.dependencies();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps.iter().next().unwrap().name, "tweet");
    }

    #[test]
    fn interface_exposes_fields_as_input_and_output() {
        struct Tweet;
        impl ComponentDefinition for Tweet {
            fn declarations(&self) -> Vec<MethodDeclaration> {
                vec![MethodDeclaration::io("fields").output("text", Type::String)
                                                    .output("likes", Type::Int)]
            }
        }
        let value = IopDeclaration::extract(ComponentType::Interface, &Tweet).to_value();
        assert_eq!(value["input"], value["output"]);
        assert_eq!(value["input"][1][0], "likes");
    }

    #[test]
    fn unmarked_definition_yields_empty_specs() {
        for kind in ComponentType::ALL {
            assert!(IopDeclaration::extract(kind, &Unmarked).is_empty());
        }
    }

    #[test]
    fn malformed_value_is_reported() {
        let err = IopDeclaration::from_value(ComponentType::Operator, &json!({"methods": []})).unwrap_err();
        assert!(matches!(err, CoreError::MalformedDeclaration(_)));
    }
}
