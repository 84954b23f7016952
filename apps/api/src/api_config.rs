use std::env;

use restmeta_application::TranslationMode;
use restmeta_core::AppError;

/// Which record store backs the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-memory store seeded with demo data.
    Memory,
    /// Postgres store addressed by `DATABASE_URL`.
    Postgres(String),
}

/// Runtime configuration read from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host.
    pub api_host: String,
    /// Bind port.
    pub api_port: u16,
    /// Origin allowed by CORS.
    pub frontend_url: String,
    /// Record store backend.
    pub store_backend: StoreBackend,
    /// How malformed filter values are treated.
    pub translation_mode: TranslationMode,
}

impl ApiConfig {
    /// Loads the configuration from the environment.
    pub fn load() -> Result<Self, AppError> {
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "memory".to_owned())
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            "postgres" => StoreBackend::Postgres(required_env("DATABASE_URL")?),
            other => {
                return Err(AppError::Configuration(format!(
                    "unknown STORE_BACKEND '{other}', expected 'memory' or 'postgres'"
                )));
            }
        };

        let translation_mode = match env::var("FILTER_MODE")
            .unwrap_or_else(|_| "lenient".to_owned())
            .as_str()
        {
            "lenient" => TranslationMode::Lenient,
            "strict" => TranslationMode::Strict,
            other => {
                return Err(AppError::Configuration(format!(
                    "unknown FILTER_MODE '{other}', expected 'lenient' or 'strict'"
                )));
            }
        };

        Ok(Self {
            api_host,
            api_port,
            frontend_url,
            store_backend,
            translation_mode,
        })
    }
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::Configuration(format!("{name} environment variable is required")))
}
