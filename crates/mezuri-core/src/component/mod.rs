//! Proxies de componentes remotos.
//!
//! Un proxy identifica un componente por `(clase, registry, nombre,
//! versión)` y resuelve de forma perezosa su especificación y su hash. Las
//! tres clases especializan la semántica de invocación:
//! - `SourceProxy`: `open` y después `method(..).call(ctx, query)`;
//! - `OperatorProxy`: `init(ctx, params)` valida los parámetros y después
//!   `method(..).call(ctx, inputs)` valida las entradas;
//! - `InterfaceProxy`: no se invoca, se usa como tipo (`as_type`).
//!
//! Toda invocación se graba en el `PipelineStepContext` activo en lugar de
//! ejecutarse.

mod call;
mod info;
mod proxy;
mod resolver;

pub use call::MethodCall;
pub use info::{ComponentInfo, ComponentType};
pub use proxy::{ComponentProxy, InterfaceProxy, KindProxy, OperatorInstance, OperatorMethod, OperatorProxy, ProxyFactory,
                SourceInstance, SourceMethod, SourceProxy};
pub use resolver::{ComponentPublisher, ComponentResolver, InMemoryResolver, PublishRequest, ResolvedComponent};
