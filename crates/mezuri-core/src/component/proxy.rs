use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;

use indexmap::IndexMap;
use log::debug;
use once_cell::unsync::OnceCell;
use serde_json::Value;

use super::call::MethodCall;
use super::info::{ComponentInfo, ComponentType};
use super::resolver::{ComponentResolver, ResolvedComponent};
use crate::constants::INIT_METHOD;
use crate::declaration::{IopDeclaration, MethodSpec, SourceMethodSpec, TypedFields};
use crate::errors::{CoreError, Result};
use crate::pipeline::PipelineStepContext;
use crate::spec::SpecDocument;
use crate::types::{InterfaceRef, Type, TypeMap};

struct ProxyInner {
    info: ComponentInfo,
    resolver: Rc<dyn ComponentResolver>,
    resolved: OnceCell<ResolvedComponent>,
}

/// Referencia a un componente remoto por coordenadas.
///
/// La especificación y el hash se piden al resolver en la primera consulta
/// y quedan cacheados durante toda la vida del proxy (y de sus clones). La
/// igualdad y el hash son por `ComponentInfo`, estén resueltos o no.
///
/// La caché no está sincronizada: el proxy no es `Send` ni `Sync`.
#[derive(Clone)]
pub struct ComponentProxy(Rc<ProxyInner>);

impl ComponentProxy {
    pub fn new(info: ComponentInfo, resolver: Rc<dyn ComponentResolver>) -> Self {
        Self(Rc::new(ProxyInner { info,
                                  resolver,
                                  resolved: OnceCell::new() }))
    }

    pub fn info(&self) -> &ComponentInfo {
        &self.0.info
    }

    pub fn component_type(&self) -> ComponentType {
        self.0.info.component_type
    }

    pub fn is_resolved(&self) -> bool {
        self.0.resolved.get().is_some()
    }

    fn resolve(&self) -> Result<&ResolvedComponent> {
        self.0.resolved.get_or_try_init(|| {
                           let resolved = self.0.resolver.get_component_version(&self.0.info)?;
                           debug!("resolved {} (hash {})", self.0.info, resolved.hash);
                           Ok(resolved)
                       })
    }

    pub fn specs(&self) -> Result<&SpecDocument> {
        Ok(&self.resolve()?.specs)
    }

    /// Hash de contenido del componente en esta versión.
    pub fn version_hash(&self) -> Result<&str> {
        Ok(self.resolve()?.hash.as_str())
    }

    pub fn iop(&self) -> Result<IopDeclaration> {
        self.specs()?.iop(self.component_type())
    }

    fn expect_kind(&self, expected: ComponentType) -> Result<()> {
        if self.component_type() != expected {
            return Err(CoreError::WrongComponentKind { component: self.0.info.to_string(),
                                                       expected: expected.to_string(),
                                                       found: self.component_type().to_string() });
        }
        Ok(())
    }

    /// Especializa el proxy según su clase.
    pub fn into_kind(self) -> KindProxy {
        match self.component_type() {
            ComponentType::Source => KindProxy::Source(SourceProxy(self)),
            ComponentType::Operator => KindProxy::Operator(OperatorProxy(self)),
            ComponentType::Interface => KindProxy::Interface(InterfaceProxy(self)),
        }
    }
}

impl PartialEq for ComponentProxy {
    fn eq(&self, other: &Self) -> bool {
        self.0.info == other.0.info
    }
}

impl Eq for ComponentProxy {}

impl Hash for ComponentProxy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.info.hash(state);
    }
}

impl fmt::Debug for ComponentProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentProxy")
         .field("info", &self.0.info)
         .field("resolved", &self.is_resolved())
         .finish()
    }
}

/// Proxy especializado por clase de componente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindProxy {
    Source(SourceProxy),
    Operator(OperatorProxy),
    Interface(InterfaceProxy),
}

/// Crea proxies que comparten un mismo resolver.
#[derive(Clone)]
pub struct ProxyFactory {
    resolver: Rc<dyn ComponentResolver>,
}

impl ProxyFactory {
    pub fn new(resolver: Rc<dyn ComponentResolver>) -> Self {
        Self { resolver }
    }

    pub fn proxy(&self, info: ComponentInfo) -> ComponentProxy {
        ComponentProxy::new(info, Rc::clone(&self.resolver))
    }

    pub fn source(&self, registry: &str, name: &str, version: &str) -> SourceProxy {
        SourceProxy(self.proxy(ComponentInfo::new(ComponentType::Source, registry, name, version)))
    }

    pub fn operator(&self, registry: &str, name: &str, version: &str) -> OperatorProxy {
        OperatorProxy(self.proxy(ComponentInfo::new(ComponentType::Operator, registry, name, version)))
    }

    pub fn interface(&self, registry: &str, name: &str, version: &str) -> InterfaceProxy {
        InterfaceProxy(self.proxy(ComponentInfo::new(ComponentType::Interface, registry, name, version)))
    }
}

fn fields_map(fields: &TypedFields) -> TypeMap {
    fields.iter().cloned().collect()
}

fn collect_inputs<I, K>(inputs: I) -> TypeMap
    where I: IntoIterator<Item = (K, Type)>,
          K: Into<String>
{
    inputs.into_iter().map(|(k, t)| (k.into(), t)).collect()
}

/// Compara el conjunto de nombres de `given` con `declared` y devuelve el
/// primer desajuste.
fn name_set_mismatch<'a, V>(declared: impl Iterator<Item = &'a String> + Clone, given: &IndexMap<String, V>) -> Option<String> {
    if let Some(missing) = declared.clone().find(|name| !given.contains_key(*name)) {
        return Some(format!("missing argument '{missing}'"));
    }
    let declared: Vec<&String> = declared.collect();
    given.keys()
         .find(|name| !declared.contains(name))
         .map(|extra| format!("unexpected argument '{extra}'"))
}

// -------------------------------------------------------------------------
// Source

/// Proxy de un Source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceProxy(ComponentProxy);

impl Deref for SourceProxy {
    type Target = ComponentProxy;

    fn deref(&self) -> &ComponentProxy {
        &self.0
    }
}

impl TryFrom<ComponentProxy> for SourceProxy {
    type Error = CoreError;

    fn try_from(proxy: ComponentProxy) -> Result<Self> {
        proxy.expect_kind(ComponentType::Source)?;
        Ok(SourceProxy(proxy))
    }
}

impl SourceProxy {
    /// Instancia el Source (sin argumentos) dentro del step en construcción.
    pub fn open(&self, ctx: &PipelineStepContext) -> Result<SourceInstance> {
        ctx.record_method_call(MethodCall::new(self.0.clone(), INIT_METHOD, TypeMap::new(), TypeMap::new()))?;
        Ok(SourceInstance { proxy: self.clone() })
    }

    fn method_spec(&self, method: &str) -> Result<SourceMethodSpec> {
        match self.0.iop()? {
            IopDeclaration::Source { mut methods } => {
                methods.swap_remove(method)
                       .ok_or_else(|| CoreError::UnknownMethod { component: self.0.info().to_string(),
                                                                 method: method.to_string() })
            }
            other => Err(CoreError::WrongComponentKind { component: self.0.info().to_string(),
                                                         expected: ComponentType::Source.to_string(),
                                                         found: other.kind().to_string() }),
        }
    }
}

/// Source ya abierto en el step actual.
#[derive(Debug, Clone)]
pub struct SourceInstance {
    proxy: SourceProxy,
}

impl SourceInstance {
    /// Método de salida declarado. Falla si no existe.
    pub fn method(&self, ctx: &PipelineStepContext, name: &str) -> Result<SourceMethod> {
        let spec = self.proxy.method_spec(name).map_err(|e| ctx.note_violation(e))?;
        Ok(SourceMethod { proxy: self.proxy.clone(),
                          name: name.to_string(),
                          spec })
    }
}

#[derive(Debug, Clone)]
pub struct SourceMethod {
    proxy: SourceProxy,
    name: String,
    spec: SourceMethodSpec,
}

impl SourceMethod {
    /// Declaración del lector del método (uri / query por defecto).
    pub fn spec(&self) -> &SourceMethodSpec {
        &self.spec
    }

    /// Graba la lectura con `query` y devuelve la salida declarada.
    pub fn call(&self, ctx: &PipelineStepContext, query: &str) -> Result<TypeMap> {
        let output = fields_map(&self.spec.output);
        let call = MethodCall::new(self.proxy.0.clone(), &self.name, TypeMap::new(), output.clone())
            .with_arguments(BTreeMap::from([("query".to_string(), Value::String(query.to_string()))]));
        ctx.record_method_call(call)?;
        Ok(output)
    }
}

// -------------------------------------------------------------------------
// Operator

/// Proxy de un Operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorProxy(ComponentProxy);

impl Deref for OperatorProxy {
    type Target = ComponentProxy;

    fn deref(&self) -> &ComponentProxy {
        &self.0
    }
}

impl TryFrom<ComponentProxy> for OperatorProxy {
    type Error = CoreError;

    fn try_from(proxy: ComponentProxy) -> Result<Self> {
        proxy.expect_kind(ComponentType::Operator)?;
        Ok(OperatorProxy(proxy))
    }
}

impl OperatorProxy {
    fn declaration(&self) -> Result<(IndexMap<String, MethodSpec>, TypeMap)> {
        match self.0.iop()? {
            IopDeclaration::Operator { methods, parameters } => Ok((methods, parameters)),
            other => Err(CoreError::WrongComponentKind { component: self.0.info().to_string(),
                                                         expected: ComponentType::Operator.to_string(),
                                                         found: other.kind().to_string() }),
        }
    }

    /// Valida `params` contra los parámetros declarados (mismo conjunto de
    /// nombres, cada valor del tipo declarado). No graba nada si falla.
    pub fn validate_parameters(&self, params: &IndexMap<String, Value>) -> Result<()> {
        let (_, declared) = self.declaration()?;
        let mismatch = |reason: String| CoreError::ArgumentMismatch { component: self.0.info().to_string(),
                                                                      method: INIT_METHOD.to_string(),
                                                                      reason };
        if let Some(reason) = name_set_mismatch(declared.keys(), params) {
            return Err(mismatch(reason));
        }
        for (name, value) in params {
            let expected = &declared[name];
            if !expected.accepts(value) {
                return Err(mismatch(format!("parameter '{name}' expects {expected}, got {value}")));
            }
        }
        Ok(())
    }

    /// Instancia el Operator con sus parámetros dentro del step en
    /// construcción.
    pub fn init<I, K>(&self, ctx: &PipelineStepContext, params: I) -> Result<OperatorInstance>
        where I: IntoIterator<Item = (K, Value)>,
              K: Into<String>
    {
        let params: IndexMap<String, Value> = params.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.validate_parameters(&params).map_err(|e| ctx.note_violation(e))?;

        let (_, declared) = self.declaration().map_err(|e| ctx.note_violation(e))?;
        let call = MethodCall::new(self.0.clone(), INIT_METHOD, declared, TypeMap::new())
            .with_arguments(params.into_iter().collect());
        ctx.record_method_call(call)?;
        Ok(OperatorInstance { proxy: self.clone() })
    }

    /// Acceso directo a un método, solo para Operators sin parámetros.
    pub fn method(&self, ctx: &PipelineStepContext, name: &str) -> Result<OperatorMethod> {
        let (_, parameters) = self.declaration().map_err(|e| ctx.note_violation(e))?;
        if !parameters.is_empty() {
            return Err(ctx.note_violation(CoreError::NotInitialized(self.0.info().to_string())));
        }
        self.method_unchecked(name).map_err(|e| ctx.note_violation(e))
    }

    fn method_unchecked(&self, name: &str) -> Result<OperatorMethod> {
        let (mut methods, _) = self.declaration()?;
        let spec = methods.swap_remove(name)
                          .ok_or_else(|| CoreError::UnknownMethod { component: self.0.info().to_string(),
                                                                    method: name.to_string() })?;
        Ok(OperatorMethod { proxy: self.clone(),
                            name: name.to_string(),
                            spec })
    }
}

/// Operator ya inicializado en el step actual.
#[derive(Debug, Clone)]
pub struct OperatorInstance {
    proxy: OperatorProxy,
}

impl OperatorInstance {
    pub fn method(&self, ctx: &PipelineStepContext, name: &str) -> Result<OperatorMethod> {
        self.proxy.method_unchecked(name).map_err(|e| ctx.note_violation(e))
    }
}

#[derive(Debug, Clone)]
pub struct OperatorMethod {
    proxy: OperatorProxy,
    name: String,
    spec: MethodSpec,
}

impl OperatorMethod {
    pub fn spec(&self) -> &MethodSpec {
        &self.spec
    }

    /// Valida `inputs` contra el `input` declarado del método, graba la
    /// llamada y devuelve la salida declarada.
    pub fn call<I, K>(&self, ctx: &PipelineStepContext, inputs: I) -> Result<TypeMap>
        where I: IntoIterator<Item = (K, Type)>,
              K: Into<String>
    {
        let inputs = collect_inputs(inputs);
        let declared = fields_map(&self.spec.input);
        let mismatch = |reason: String| {
            ctx.note_violation(CoreError::ArgumentMismatch { component: self.proxy.info().to_string(),
                                                             method: self.name.clone(),
                                                             reason })
        };
        if let Some(reason) = name_set_mismatch(declared.keys(), &inputs) {
            return Err(mismatch(reason));
        }
        for (name, given) in &inputs {
            let expected = &declared[name];
            if expected != given {
                return Err(mismatch(format!("input '{name}' expects {expected}, got {given}")));
            }
        }

        let output = fields_map(&self.spec.output);
        ctx.record_method_call(MethodCall::new(self.proxy.0.clone(), &self.name, inputs, output.clone()))?;
        Ok(output)
    }
}

// -------------------------------------------------------------------------
// Interface

/// Proxy de una Interface. Construirla es una identidad: las interfaces son
/// marcadores estructurales que se usan como tipos, no se ejecutan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceProxy(ComponentProxy);

impl Deref for InterfaceProxy {
    type Target = ComponentProxy;

    fn deref(&self) -> &ComponentProxy {
        &self.0
    }
}

impl TryFrom<ComponentProxy> for InterfaceProxy {
    type Error = CoreError;

    fn try_from(proxy: ComponentProxy) -> Result<Self> {
        proxy.expect_kind(ComponentType::Interface)?;
        Ok(InterfaceProxy(proxy))
    }
}

impl InterfaceProxy {
    /// Tipo `Interface(..)` que referencia a este componente. No resuelve.
    pub fn as_type(&self) -> Type {
        let info = self.0.info();
        Type::Interface(InterfaceRef::new(info.registry_url.as_str(), info.name.as_str(), info.version.as_str()))
    }

    /// Campos declarados de la interfaz (resuelve si hace falta).
    pub fn fields(&self) -> Result<TypedFields> {
        match self.0.iop()? {
            IopDeclaration::Interface { fields } => Ok(fields),
            other => Err(CoreError::WrongComponentKind { component: self.0.info().to_string(),
                                                         expected: ComponentType::Interface.to_string(),
                                                         found: other.kind().to_string() }),
        }
    }
}
