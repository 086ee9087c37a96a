//! Store configuration.
//!
//! Connection details are supplied from outside (environment or CLI, see the
//! server's config module); these structs only carry them.

use std::str::FromStr;
use std::time::Duration;

/// Which backend serves the `tournaments` collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Hosted backend over its REST interface
    #[default]
    Rest,
    /// Direct PostgreSQL connection
    Postgres,
    /// In-process store, data is lost on exit
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rest" => Ok(StoreBackend::Rest),
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("Unknown store backend: {other}")),
        }
    }
}

/// REST backend connection
#[derive(Debug, Clone, Default)]
pub struct RestConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// API key sent as both `apikey` and bearer token
    pub api_key: String,
}

/// PostgreSQL pool configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,

    /// Maximum connection lifetime in seconds
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    /// Local development defaults
    pub fn development() -> Self {
        Self {
            database_url: "postgres://postgres@localhost/tournaments".to_string(),
            max_connections: 10,
            min_connections: 1,
            connection_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::development()
    }
}

/// Complete store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Collection (table) name
    pub table: String,
    /// Per-operation timeout in seconds
    pub timeout_secs: u64,
    pub rest: RestConfig,
    pub database: DatabaseConfig,
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// In-memory configuration, handy for tests and demos
    pub fn memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            ..Self::default()
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Rest,
            table: "tournaments".to_string(),
            timeout_secs: 5,
            rest: RestConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend() {
        assert_eq!("REST".parse::<StoreBackend>().unwrap(), StoreBackend::Rest);
        assert_eq!("pg".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.table, "tournaments");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(StoreConfig::memory().backend, StoreBackend::Memory);
    }
}
