use std::collections::{BTreeSet, HashMap};

use serde_json::{json, Value};

use super::step::PipelineStep;
use crate::component::{ComponentInfo, MethodCall};
use crate::errors::{CoreError, Result};

/// Pipeline definido por su step terminal.
///
/// No posee los steps: varios pipelines pueden compartirlos. Su hash es el
/// del step terminal, que cubre de forma transitiva a todos sus
/// predecesores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    terminal: PipelineStep,
    version_hash: String,
}

impl Pipeline {
    /// Falla con `StepNotBuilt` si el step terminal no está congelado.
    pub fn new(terminal: PipelineStep) -> Result<Self> {
        let version_hash = terminal.version_hash()?;
        Ok(Self { terminal, version_hash })
    }

    pub fn terminal(&self) -> &PipelineStep {
        &self.terminal
    }

    pub fn version_hash(&self) -> &str {
        &self.version_hash
    }

    /// Todos los steps alcanzables, cada uno una vez y siempre después de
    /// sus predecesores (el terminal queda el último).
    pub fn steps(&self) -> Vec<PipelineStep> {
        let mut ordered = Vec::new();
        let mut seen = BTreeSet::new();
        visit(&self.terminal, &mut seen, &mut ordered);
        ordered
    }

    /// Componentes usados por el pipeline, ordenados.
    pub fn dependencies(&self) -> BTreeSet<ComponentInfo> {
        self.steps()
            .iter()
            .filter_map(PipelineStep::component)
            .map(|c| c.info().clone())
            .collect()
    }

    /// Descripción JSON: cada step con su componente, sus llamadas, sus
    /// predecesores (por índice en `steps`) y su hash.
    pub fn describe(&self) -> Result<Value> {
        let steps = self.steps();
        let index: HashMap<usize, usize> = steps.iter().enumerate().map(|(i, s)| (s.ptr_id(), i)).collect();
        let mut described = Vec::with_capacity(steps.len());
        for step in &steps {
            let frozen = step.frozen().ok_or(CoreError::StepNotBuilt)?;
            let predecessors: Vec<usize> = frozen.predecessors.iter().filter_map(|p| index.get(&p.ptr_id()).copied()).collect();
            described.push(json!({
                "component": frozen.component.info(),
                "calls": frozen.calls.iter().map(MethodCall::to_value).collect::<Vec<_>>(),
                "predecessors": predecessors,
                "versionHash": frozen.version_hash,
            }));
        }
        Ok(json!({"versionHash": self.version_hash, "steps": described}))
    }
}

fn visit(step: &PipelineStep, seen: &mut BTreeSet<usize>, ordered: &mut Vec<PipelineStep>) {
    if !seen.insert(step.ptr_id()) {
        return;
    }
    for pred in step.predecessors() {
        visit(&pred, seen, ordered);
    }
    ordered.push(step.clone());
}
