use crate::error::{ConfigError, Result as AppResult};
use config::{Config, Environment, File, Value, ValueKind};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
}

/// Connection details for the hosted question store (Supabase REST surface).
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://xyzcompany.supabase.co`.
    pub url: String,
    /// Publishable API key, sent as both `apikey` and bearer token.
    pub api_key: String,
    pub question_table: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Public bucket holding question and option images.
    pub bucket: String,
}

#[derive(Debug, Deserialize)]
pub struct AppSettings {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub storage: StorageConfig,
}

pub fn load_settings() -> AppResult<AppSettings> {
    let mut builder = Config::builder()
        .add_source(
            Environment::with_prefix("GICHUL")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .try_parsing(true),
        )
        .add_source(File::with_name("config").required(false));

    builder = builder
        .set_default("server.port", Value::new(None, ValueKind::U64(8080)))
        .and_then(|b| {
            b.set_default(
                "server.cors_origins",
                Value::new(None, ValueKind::Array(Vec::new())),
            )
        })
        .and_then(|b| {
            b.set_default(
                "store.question_table",
                Value::new(None, ValueKind::String("questions_v2".to_string())),
            )
        })
        .and_then(|b| {
            b.set_default(
                "storage.bucket",
                Value::new(None, ValueKind::String("quiz-images".to_string())),
            )
        })
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let settings = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    settings
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()).into())
}
