use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use log::{debug, warn};
use serde_json::Value;

use super::context::{PipelineStepContext, StepDraft};
use super::status::StepStatus;
use crate::component::{ComponentProxy, MethodCall};
use crate::errors::{CoreError, Result};
use crate::hashing::{hash_str, hash_value, xor_digests};
use crate::types::TypeMap;

/// Contenido inmutable de un step ya construido.
#[derive(Debug)]
pub struct FrozenStep {
    pub component: ComponentProxy,
    pub calls: Vec<MethodCall>,
    pub predecessors: Vec<PipelineStep>,
    pub output: TypeMap,
    pub version_hash: String,
}

#[derive(Debug)]
enum StepState {
    Empty,
    Building,
    Frozen(Rc<FrozenStep>),
}

/// Step de un pipeline.
///
/// Es un handle compartido: los clones apuntan al mismo step y la igualdad
/// es por identidad. Se construye una sola vez con `build`; si el bloque
/// falla, el step vuelve a `Empty` y se puede reintentar.
#[derive(Clone)]
pub struct PipelineStep(Rc<RefCell<StepState>>);

impl Default for PipelineStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(StepState::Empty)))
    }

    pub fn status(&self) -> StepStatus {
        match &*self.0.borrow() {
            StepState::Empty => StepStatus::Empty,
            StepState::Building => StepStatus::Building,
            StepState::Frozen(_) => StepStatus::Frozen,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.status() == StepStatus::Frozen
    }

    /// Contenido congelado, si ya existe.
    pub fn frozen(&self) -> Option<Rc<FrozenStep>> {
        match &*self.0.borrow() {
            StepState::Frozen(f) => Some(Rc::clone(f)),
            _ => None,
        }
    }

    /// Construye el step grabando lo que `body` invoca a través de `ctx`.
    ///
    /// Falla con `StepAlreadySet` si el step no está vacío y con
    /// `NestedContext` si `ctx` ya está construyendo otro step. Cualquier
    /// error dentro de `body` (o una violación de contrato capturada por el
    /// autor) descarta la grabación y deja el step en `Empty`.
    pub fn build<F>(&self, ctx: &PipelineStepContext, body: F) -> Result<()>
        where F: FnOnce(&PipelineStepContext) -> Result<()>
    {
        if !matches!(*self.0.borrow(), StepState::Empty) {
            return Err(CoreError::StepAlreadySet);
        }
        ctx.enter(self)?;
        *self.0.borrow_mut() = StepState::Building;

        let result = body(ctx);
        let draft = ctx.exit();
        let frozen = result.and_then(|_| match draft {
                               Some(draft) => freeze(draft),
                               None => Err(CoreError::OutsideContext),
                           });

        match frozen {
            Ok(frozen) => {
                debug!("step frozen with {} call(s), hash {}", frozen.calls.len(), frozen.version_hash);
                *self.0.borrow_mut() = StepState::Frozen(Rc::new(frozen));
                Ok(())
            }
            Err(e) => {
                warn!("pipeline step rolled back: {e}");
                *self.0.borrow_mut() = StepState::Empty;
                Err(e)
            }
        }
    }

    /// Salida del step. Dentro de la construcción de otro step, lo registra
    /// como predecesor.
    pub fn output(&self, ctx: &PipelineStepContext) -> Result<TypeMap> {
        let frozen = self.frozen().ok_or(CoreError::StepNotBuilt)?;
        ctx.record_step_output_access(self);
        Ok(frozen.output.clone())
    }

    /// Salida sin registrar acceso.
    pub fn peek_output(&self) -> Option<TypeMap> {
        self.frozen().map(|f| f.output.clone())
    }

    pub fn version_hash(&self) -> Result<String> {
        self.frozen().map(|f| f.version_hash.clone()).ok_or(CoreError::StepNotBuilt)
    }

    pub fn predecessors(&self) -> Vec<PipelineStep> {
        self.frozen().map(|f| f.predecessors.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<MethodCall> {
        self.frozen().map(|f| f.calls.clone()).unwrap_or_default()
    }

    pub fn component(&self) -> Option<ComponentProxy> {
        self.frozen().map(|f| f.component.clone())
    }

    pub(crate) fn ptr_id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

/// Cierra una grabación: reporta violaciones y la falta de salida, y
/// calcula el hash.
fn freeze(draft: StepDraft) -> Result<FrozenStep> {
    if let Some(violation) = draft.violation {
        return Err(violation);
    }
    let (Some(output), Some(component)) = (draft.output, draft.bound) else {
        return Err(CoreError::NoOutput);
    };
    let version_hash = compute_version_hash(&component, &draft.calls, &draft.predecessors)?;
    Ok(FrozenStep { component,
                    calls: draft.calls,
                    predecessors: draft.predecessors,
                    output,
                    version_hash })
}

/// `H(xor(H(hash del componente), H(llamadas), H(pred:n) por cada hash de
/// predecesor distinto))`, con `n` las veces que aparece ese hash.
///
/// El XOR hace que el orden de los predecesores no cuente; agrupar hashes
/// iguales antes de combinarlos impide que dos predecesores con el mismo
/// contenido se cancelen, y volver a hashear en cada nivel impide que lo haga
/// un ancestro compartido (diamante).
fn compute_version_hash(component: &ComponentProxy, calls: &[MethodCall], predecessors: &[PipelineStep]) -> Result<String> {
    let mut multiplicity: BTreeMap<String, usize> = BTreeMap::new();
    for pred in predecessors {
        *multiplicity.entry(pred.version_hash()?).or_default() += 1;
    }
    let mut digests = vec![hash_str(component.version_hash()?),
                           hash_value(&Value::Array(calls.iter().map(MethodCall::to_value).collect()))];
    digests.extend(multiplicity.iter().map(|(hash, n)| hash_str(&format!("{hash}:{n}"))));
    let combined = xor_digests(&digests).ok_or_else(|| CoreError::Serialization("invalid step digest".to_string()))?;
    Ok(hash_str(&combined))
}

impl PartialEq for PipelineStep {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for PipelineStep {}

impl Hash for PipelineStep {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ptr_id().hash(state);
    }
}

impl fmt::Debug for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(state) => match &*state {
                StepState::Frozen(frozen) => f.debug_struct("PipelineStep")
                                              .field("component", frozen.component.info())
                                              .field("version_hash", &frozen.version_hash)
                                              .finish(),
                other => f.debug_tuple("PipelineStep").field(other).finish(),
            },
            Err(_) => f.write_str("PipelineStep(<borrowed>)"),
        }
    }
}
