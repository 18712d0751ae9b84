/// Estado de un `PipelineStep`.
///
/// Las transiciones válidas son:
/// - `Empty` -> `Building` (al entrar en `build`)
/// - `Building` -> `Frozen` (el bloque terminó sin errores y hay salida)
/// - `Building` -> `Empty` (rollback ante cualquier error)
///
/// `Frozen` es terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Sin construir; admite un nuevo `build`.
    Empty,
    /// Grabando llamadas dentro de su contexto.
    Building,
    /// Inmutable; su salida y su hash están disponibles.
    Frozen,
}
