use std::cell::RefCell;

use log::debug;

use super::step::PipelineStep;
use crate::component::{ComponentProxy, MethodCall};
use crate::errors::{CoreError, Result};
use crate::types::TypeMap;

/// Grabación en curso de un step.
#[derive(Debug)]
pub(crate) struct StepDraft {
    pub(crate) step: PipelineStep,
    pub(crate) calls: Vec<MethodCall>,
    pub(crate) bound: Option<ComponentProxy>,
    pub(crate) initialized: bool,
    pub(crate) output: Option<TypeMap>,
    pub(crate) predecessors: Vec<PipelineStep>,
    /// Primera violación de contrato observada, aunque el autor la haya
    /// capturado dentro del bloque.
    pub(crate) violation: Option<CoreError>,
}

impl StepDraft {
    fn new(step: PipelineStep) -> Self {
        Self { step,
               calls: Vec::new(),
               bound: None,
               initialized: false,
               output: None,
               predecessors: Vec::new(),
               violation: None }
    }

    /// Reglas de validación de cada llamada, en orden: componente ligado,
    /// una sola inicialización, una sola salida.
    fn check(&self, call: &MethodCall) -> Result<()> {
        if let Some(bound) = &self.bound {
            if bound != &call.component {
                return Err(CoreError::ComponentMismatch { bound: bound.info().to_string(),
                                                          used: call.component.info().to_string() });
            }
        }
        if call.is_init() {
            if self.initialized {
                return Err(CoreError::ComponentReinitialized(call.component.info().to_string()));
            }
        } else if self.output.is_some() {
            return Err(CoreError::OutputAlreadySet(call.method.clone()));
        }
        Ok(())
    }

    fn apply(&mut self, call: MethodCall) {
        if self.bound.is_none() {
            self.bound = Some(call.component.clone());
        }
        if call.is_init() {
            self.initialized = true;
        } else {
            self.output = Some(call.output_specs.clone());
        }
        self.calls.push(call);
    }
}

/// Contexto de grabación de steps.
///
/// Sustituye a un recorder global: se pasa por referencia a los proxies y a
/// `PipelineStep::build`. Solo un step puede estar en construcción a la vez
/// por contexto; entrar dos veces es un error (`NestedContext`).
///
/// No es thread-safe (usa `RefCell` sin sincronización) y no es `Sync`.
#[derive(Debug, Default)]
pub struct PipelineStepContext {
    draft: RefCell<Option<StepDraft>>,
}

impl PipelineStepContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.draft.borrow().is_some()
    }

    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(CoreError::OutsideContext)
        }
    }

    pub(crate) fn enter(&self, step: &PipelineStep) -> Result<()> {
        let mut draft = self.draft.borrow_mut();
        if draft.is_some() {
            return Err(CoreError::NestedContext);
        }
        debug!("entering pipeline step context");
        *draft = Some(StepDraft::new(step.clone()));
        Ok(())
    }

    pub(crate) fn exit(&self) -> Option<StepDraft> {
        debug!("leaving pipeline step context");
        self.draft.borrow_mut().take()
    }

    /// Valida y graba una llamada interceptada por un proxy.
    pub fn record_method_call(&self, call: MethodCall) -> Result<()> {
        let mut slot = self.draft.borrow_mut();
        let draft = slot.as_mut().ok_or(CoreError::OutsideContext)?;
        if let Err(e) = draft.check(&call) {
            draft.violation.get_or_insert_with(|| e.clone());
            return Err(e);
        }
        debug!("recorded {}.{}", call.component.info(), call.method);
        draft.apply(call);
        Ok(())
    }

    /// Anota `error` como violación del step en construcción, si la es, y lo
    /// devuelve. Así una violación capturada por el autor también deshace el
    /// step. Fuera de un step no hace nada.
    pub fn note_violation(&self, error: CoreError) -> CoreError {
        if error.is_contract_violation() {
            if let Some(draft) = self.draft.borrow_mut().as_mut() {
                draft.violation.get_or_insert_with(|| error.clone());
            }
        }
        error
    }

    /// Registra la lectura de la salida de `step`. Solo cuenta si hay un step
    /// en construcción y es otro distinto; el conjunto no tiene duplicados.
    pub fn record_step_output_access(&self, step: &PipelineStep) {
        let mut slot = self.draft.borrow_mut();
        let Some(draft) = slot.as_mut() else { return };
        if draft.step == *step || draft.predecessors.contains(step) {
            return;
        }
        debug!("step output read as predecessor");
        draft.predecessors.push(step.clone());
    }
}
