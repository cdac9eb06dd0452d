use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Connection pool bounds. The test harness pins both to 1 so every
    /// connection sees the same in-memory SQLite database.
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EvaluationConfig {
    /// Retry budget for the best-result compare-and-swap loop.
    pub max_tracker_retries: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArtifactConfig {
    /// Base URL artifact references are joined onto when building download links.
    pub base_url: String,
    /// Upper bound on declared artifact size, in bytes.
    pub max_file_size: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub evaluation: EvaluationConfig,
    pub artifacts: ArtifactConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite::memory:")?
            .set_default("database.max_connections", 100)?
            .set_default("database.min_connections", 5)?
            .set_default("evaluation.max_tracker_retries", 8)?
            .set_default("artifacts.base_url", "http://localhost:9000/artifacts")?
            .set_default("artifacts.max_file_size", 512 * 1024 * 1024)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., PODIUM__DATABASE__URL)
            .add_source(Environment::with_prefix("PODIUM").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
