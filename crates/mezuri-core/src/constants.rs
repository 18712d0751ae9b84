//! Constantes compartidas del core.
//!
//! Varias participan en formatos persistidos (tags, documento de
//! especificación) o en el cálculo de `version_hash`; cambiarlas rompe la
//! compatibilidad con componentes ya publicados.

/// Prefijo de todos los tags de versión (`mezuri/{type}/{name}/{version}/{n}`).
pub const TAG_PREFIX: &str = "mezuri";

/// Mensaje de los tags anotados creados en cada commit de versión.
pub const TAG_MESSAGE_PREFIX: &str = "Create Component version";

/// Nombre por defecto del documento de especificación.
pub const SPEC_FILENAME: &str = "specification.json";

/// Versión inicial de un componente recién creado.
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Nombre del método equivalente al constructor ("inicializar con
/// parámetros"). Un step admite como mucho una llamada con este nombre.
pub const INIT_METHOD: &str = "__init__";

/// Identidad con la que se firman los commits de procedencia.
pub const PROVENANCE_NAME: &str = "Mezuri Provenance";
pub const PROVENANCE_EMAIL: &str = "provenance@mezuri.org";
