//! API configuration

use serde::Deserialize;

use core_kernel::Timezone;

/// Which store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// PostgreSQL at `database_url`
    Postgres,
    /// Process-local memory; data is lost on restart
    Memory,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Store backend
    pub store: StoreKind,
    /// Database URL
    pub database_url: String,
    /// Maximum connections in the database pool
    pub db_max_connections: u32,
    /// Log level, used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON log lines
    pub log_json: bool,
    /// Timezone in which "today" is computed
    pub timezone: Timezone,
    /// Seconds between background delinquency sweeps, `0` disables
    pub delinquency_sweep_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            store: StoreKind::Postgres,
            database_url: "postgres://localhost/enrollment".to_string(),
            db_max_connections: 10,
            log_level: "info".to_string(),
            log_json: false,
            timezone: Timezone::default(),
            delinquency_sweep_secs: 24 * 60 * 60,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.store, StoreKind::Postgres);
        assert_eq!(config.timezone.name(), "UTC");
    }

    #[test]
    fn test_partial_source_keeps_defaults() {
        let config: ApiConfig = config::Config::builder()
            .set_override("port", 9090)
            .unwrap()
            .set_override("store", "memory")
            .unwrap()
            .set_override("timezone", "America/Fortaleza")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.timezone.name(), "America/Fortaleza");
        assert_eq!(config.host, "0.0.0.0");
    }
}
