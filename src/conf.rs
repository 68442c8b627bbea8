use config::{Config, ConfigError, Environment};
use lazy_static::lazy_static;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub service_name: String,
    pub listen_port: String,
    pub database_url: String,
    pub database_pool_max_connections: u32,
    /// `postgres` or `memory`
    pub storage_backend: String,
    pub session_ttl_hours: i64,
    //client
    pub api_base_url: String,
    pub cache_stale_secs: u64,
    /// `entity` drops every cached query of a listing kind after a status
    /// change, `buckets` only the affected status lists and the record.
    pub cache_invalidation: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let conf = Config::builder()
            .set_default("service_name", "edumarket")?
            .set_default("listen_port", "3000")?
            .set_default("database_url", "postgres://localhost:5432/edumarket")?
            .set_default("database_pool_max_connections", 10)?
            .set_default("storage_backend", "postgres")?
            .set_default("session_ttl_hours", 24)?
            .set_default("api_base_url", "http://localhost:3000")?
            .set_default("cache_stale_secs", 30)?
            .set_default("cache_invalidation", "entity")?
            .add_source(Environment::default())
            .build()?;
        let s: Settings = conf.try_deserialize()?;
        match s.storage_backend.as_str() {
            "postgres" | "memory" => {}
            other => {
                return Err(ConfigError::Message(format!(
                    "unsupported storage backend `{}`",
                    other
                )))
            }
        }
        Ok(s)
    }
}

lazy_static! {
    pub static ref settings: Settings = Settings::new().expect("improperly configured");
}
