//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: ADDRESS_, nested keys separated by `__`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/address-service/config.toml
//! 4. System directory: /etc/address-service/config.toml
//! 5. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::distance::MIN_REQUEST_INTERVAL;
use crate::error::{Error, Result};

const ENV_PREFIX: &str = "ADDRESS_";
const APP_DIR: &str = "address-service";
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Address store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// External geocoding service configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log filter: a level (trace, debug, info, warn, error, off), optionally
    /// with per-target overrides such as `info,address_service=debug`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            port: default_port(),
            log_level: default_log_level(),
            timeout_secs: default_timeout(),
            environment: default_environment(),
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL (`sqlite://addresses.db`, `sqlite::memory:`)
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum idle connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Maximum retry attempts for establishing database connection
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retry attempts in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Create the database file when it does not exist yet
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_secs: default_connection_timeout(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
            create_if_missing: true,
        }
    }
}

impl DatabaseConfig {
    /// Whether the URL points at a transient in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }
}

/// Geocoding service configuration (Nominatim-compatible search API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL; requests go to `{base_url}/search`
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,

    /// User-Agent sent with every lookup (required by the Nominatim usage policy)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_secs: u64,

    /// Pause between the two lookups of a distance calculation, in milliseconds
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_geocoding_timeout(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
        }
    }
}

impl GeocodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay between lookups, never shorter than the service's rate limit
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms).max(MIN_REQUEST_INTERVAL)
    }
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// CORS configuration
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            cors_mode: default_cors_mode(),
        }
    }
}

// Default value functions
fn default_service_name() -> String {
    APP_DIR.to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_database_url() -> String {
    "sqlite://addresses.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    2
}

fn default_true() -> bool {
    true
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("{}/{}", APP_DIR, env!("CARGO_PKG_VERSION"))
}

fn default_geocoding_timeout() -> u64 {
    10
}

fn default_rate_limit_delay_ms() -> u64 {
    MIN_REQUEST_INTERVAL.as_millis() as u64
}

fn default_body_limit_mb() -> usize {
    1
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Searches for config files in this order (first found wins per key):
    /// 1. Current working directory: ./config.toml
    /// 2. XDG config directory: ~/.config/address-service/config.toml
    /// 3. System directory: /etc/address-service/config.toml
    ///
    /// Environment variables (ADDRESS_ prefix) override all file-based configs.
    pub fn load() -> Result<Self> {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so that higher priority files override lower ones
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// This bypasses XDG directories and loads directly from the given path.
    /// Environment variables still take precedence.
    pub fn load_from(path: &str) -> Result<Self> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the service cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.service.name.trim().is_empty() {
            return Err(Error::Internal("service.name cannot be empty".to_string()));
        }

        if self.service.port == 0 {
            return Err(Error::Internal(
                "service.port must be greater than 0".to_string(),
            ));
        }

        if !is_valid_log_filter(&self.service.log_level) {
            return Err(Error::Internal(format!(
                "service.log_level must be a level ({}) or comma-separated target=level directives, got {:?}",
                VALID_LOG_LEVELS.join(", "),
                self.service.log_level
            )));
        }

        if self.database.url.trim().is_empty() {
            return Err(Error::Internal("database.url cannot be empty".to_string()));
        }

        if self.geocoding.base_url.trim().is_empty() {
            return Err(Error::Internal(
                "geocoding.base_url cannot be empty".to_string(),
            ));
        }

        // A distance request makes two lookups with a pause between them and
        // must finish inside the request timeout.
        let distance_budget = self.geocoding.timeout() * 2 + self.geocoding.rate_limit_delay();
        if self.service.request_timeout() <= distance_budget {
            return Err(Error::Internal(format!(
                "service.timeout_secs ({}s) must exceed two geocoding timeouts plus the rate limit delay ({:?})",
                self.service.timeout_secs, distance_budget
            )));
        }

        Ok(())
    }

    /// Find all possible config file paths
    ///
    /// Returns paths in priority order (highest first).
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_DIR);
        if let Some(path) = xdg_dirs.find_config_file("config.toml") {
            paths.push(path);
        }

        paths.push(PathBuf::from("/etc").join(APP_DIR).join("config.toml"));

        paths
    }
}

/// Accepts `info` or `warn,address_service=debug` style filters
fn is_valid_log_filter(filter: &str) -> bool {
    let is_level = |level: &str| VALID_LOG_LEVELS.contains(&level.trim().to_lowercase().as_str());

    !filter.trim().is_empty()
        && filter.split(',').all(|directive| match directive.split_once('=') {
            Some((target, level)) => !target.trim().is_empty() && is_level(level),
            None => is_level(directive),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.database.url, "sqlite://addresses.db");
        assert_eq!(
            config.geocoding.base_url,
            "https://nominatim.openstreetmap.org"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rate_limit_delay_never_below_minimum() {
        let mut geocoding = GeocodingConfig::default();
        assert_eq!(geocoding.rate_limit_delay(), MIN_REQUEST_INTERVAL);

        geocoding.rate_limit_delay_ms = 10;
        assert_eq!(geocoding.rate_limit_delay(), MIN_REQUEST_INTERVAL);

        geocoding.rate_limit_delay_ms = 2500;
        assert_eq!(geocoding.rate_limit_delay(), Duration::from_millis(2500));
    }

    #[test]
    fn test_in_memory_detection() {
        let mut database = DatabaseConfig::default();
        assert!(!database.is_in_memory());

        database.url = "sqlite::memory:".to_string();
        assert!(database.is_in_memory());

        database.url = "sqlite:file:test?mode=memory&cache=shared".to_string();
        assert!(database.is_in_memory());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.service.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.service.log_level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.database.url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level_accepts_target_directives() {
        let mut config = Config::default();
        config.service.log_level = "address_service=debug".to_string();
        assert!(config.validate().is_ok());

        config.service.log_level = "warn, address_service=DEBUG,sqlx=off".to_string();
        assert!(config.validate().is_ok());

        config.service.log_level = "address_service=loud".to_string();
        assert!(config.validate().is_err());

        config.service.log_level = "=debug".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_timeout_must_cover_distance_lookups() {
        let mut config = Config::default();
        config.geocoding.timeout_secs = 15;
        assert!(config.validate().is_err());

        config.service.timeout_secs = 45;
        assert!(config.validate().is_ok());

        config.geocoding.timeout_secs = 10;
        config.geocoding.rate_limit_delay_ms = 25_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            r#"
[service]
name = "addresses-test"
port = 9191

[database]
url = "sqlite::memory:"

[geocoding]
base_url = "http://localhost:9999"
rate_limit_delay_ms = 1500
"#
        )
        .expect("write config");

        let path = file.path().to_str().expect("utf-8 path");
        let config = Config::load_from(path).expect("load config");

        assert_eq!(config.service.name, "addresses-test");
        assert_eq!(config.service.port, 9191);
        assert_eq!(config.service.log_level, "info");
        assert!(config.database.is_in_memory());
        assert_eq!(config.geocoding.base_url, "http://localhost:9999");
        assert_eq!(
            config.geocoding.rate_limit_delay(),
            Duration::from_millis(1500)
        );
    }
}
