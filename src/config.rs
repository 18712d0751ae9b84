//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) una sola vez y expone una estructura
//! inmutable (`CONFIG`).
use std::env;

use mezuri_core::constants::SPEC_FILENAME;
use once_cell::sync::Lazy;

pub const DEFAULT_REGISTRY_URL: &str = "http://registry.mezuri.org";

/// Configuración global de la aplicación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Nombre del documento de especificación en la raíz del componente.
    pub spec_filename: String,
    /// Registry usado al publicar si no se indica otro.
    pub default_registry: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { spec_filename: SPEC_FILENAME.to_string(),
               default_registry: DEFAULT_REGISTRY_URL.to_string() }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignora error si no existe .env
        let defaults = Self::default();
        Self { spec_filename: env::var("MEZURI_SPEC_FILENAME").unwrap_or(defaults.spec_filename),
               default_registry: env::var("MEZURI_REGISTRY_URL").unwrap_or(defaults.default_registry) }
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);
