//! Configuración del registry desde variables de entorno.
//! `MEZURI_REGISTRY_PUBLIC_URL` es la URL con la que el registry se
//! identifica en los dependents; `MEZURI_SPEC_FILENAME` el fichero de
//! especificación que se lee de los remotos.

use std::env;

use dotenvy::dotenv;
use mezuri_core::constants::SPEC_FILENAME;
use once_cell::sync::Lazy;

pub const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:5000";

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub url: String,
    pub spec_filename: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { url: DEFAULT_PUBLIC_URL.to_string(),
               spec_filename: SPEC_FILENAME.to_string() }
    }
}

impl RegistryConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let url = env::var("MEZURI_REGISTRY_PUBLIC_URL").unwrap_or_else(|_| DEFAULT_PUBLIC_URL.to_string());
        let spec_filename = env::var("MEZURI_SPEC_FILENAME").unwrap_or_else(|_| SPEC_FILENAME.to_string());
        Self { url, spec_filename }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }
}
