//! Construcción de pipelines.
//!
//! Un step se construye dentro de un bloque con `PipelineStep::build`:
//! durante ese bloque las llamadas a proxies se graban (no se ejecutan) y
//! se validan. Al salir sin errores el step queda congelado y expone su
//! salida y su `version_hash`; leer su salida desde otro step en
//! construcción lo convierte en predecesor de ese step.
//!
//! ```
//! use std::rc::Rc;
//! use mezuri_core::component::{ComponentInfo, ComponentType, InMemoryResolver, ProxyFactory};
//! use mezuri_core::declaration::{ComponentDefinition, IopDeclaration, MethodDeclaration};
//! use mezuri_core::pipeline::{Pipeline, PipelineStep, PipelineStepContext};
//! use mezuri_core::spec::SpecDocument;
//! use mezuri_core::types::Type;
//! use mezuri_core::version::Version;
//!
//! struct Lines;
//! impl ComponentDefinition for Lines {
//!     fn declarations(&self) -> Vec<MethodDeclaration> {
//!         vec![MethodDeclaration::io("lines").output("line", Type::String)]
//!     }
//! }
//!
//! let mut specs = SpecDocument::new("lines", "", Version::new(1, 0, 0));
//! specs.set_iop(&IopDeclaration::extract(ComponentType::Source, &Lines));
//! let info = ComponentInfo::new(ComponentType::Source, "http://r", "lines", "1.0.0");
//! let factory = ProxyFactory::new(Rc::new(InMemoryResolver::new().with_component(info, specs, "h1")));
//! let source = factory.source("http://r", "lines", "1.0.0");
//!
//! let ctx = PipelineStepContext::new();
//! let step = PipelineStep::new();
//! step.build(&ctx, |ctx| {
//!         source.open(ctx)?.method(ctx, "lines")?.call(ctx, "*")?;
//!         Ok(())
//!     })
//!     .unwrap();
//! let pipeline = Pipeline::new(step).unwrap();
//! assert_eq!(pipeline.steps().len(), 1);
//! ```

mod context;
#[allow(clippy::module_inception)]
mod pipeline;
mod status;
mod step;

pub use context::PipelineStepContext;
pub use pipeline::Pipeline;
pub use status::StepStatus;
pub use step::{FrozenStep, PipelineStep};
