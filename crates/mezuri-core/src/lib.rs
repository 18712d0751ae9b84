//! mezuri-core: declaración, composición y versionado de componentes.
//!
//! Capas, de las hojas hacia arriba:
//! - `types`: tipos serializables de las entradas y salidas.
//! - `declaration`: declaraciones IOP de un componente.
//! - `component`: proxies de componentes remotos y llamadas grabadas.
//! - `pipeline`: contexto de grabación, steps congelados y hash de pipeline.
//! - `version`, `spec`, `revision`: versionado, documento de
//!   especificación y revision store.
pub mod component;
pub mod constants;
pub mod declaration;
pub mod errors;
pub mod hashing;
pub mod pipeline;
pub mod revision;
pub mod spec;
pub mod types;
pub mod version;

pub use component::{ComponentInfo, ComponentProxy, ComponentPublisher, ComponentResolver, ComponentType, InMemoryResolver,
                    InterfaceProxy, MethodCall, OperatorProxy, ProxyFactory, PublishRequest, ResolvedComponent, SourceProxy};
pub use declaration::{ComponentDefinition, IopDeclaration, MethodDeclaration};
pub use errors::{CoreError, Result};
pub use pipeline::{Pipeline, PipelineStep, PipelineStepContext, StepStatus};
pub use revision::{InMemoryRemotes, InMemoryRevisionStore, RevisionStore};
pub use spec::SpecDocument;
pub use types::{Type, TypeMap};
pub use version::{Version, VersionTag};
